#[macro_export]
macro_rules! impl_newtype {
    ($name:ty, $inner:ty) => {
        impl $name {
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}
