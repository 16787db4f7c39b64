use crate::{Backend, Texture};

/// Two versions of the same resource, swapped implicitly after each frame by
/// flipping which one is considered current; contents are never copied.
#[derive(Clone, Debug)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl DoubleBuffered<Texture> {
    pub fn destroy<B>(self, backend: &mut B)
    where
        B: Backend,
    {
        self.a.destroy(backend);
        self.b.destroy(backend);
    }
}

impl<T> DoubleBuffered<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, alternate: bool) -> &T {
        if alternate {
            &self.b
        } else {
            &self.a
        }
    }

    /// Returns the version written during the frame of given parity.
    pub fn curr(&self, alternate: bool) -> &T {
        self.get(alternate)
    }

    /// Returns the version written during the previous frame.
    pub fn prev(&self, alternate: bool) -> &T {
        self.get(!alternate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.a, &self.b].into_iter()
    }
}
