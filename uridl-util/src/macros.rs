#[macro_export]
macro_rules! select {
    ($selectors:literal) => {{
        static SELECTOR: ::once_cell::sync::Lazy<::scraper::selector::Selector> =
            ::once_cell::sync::Lazy::new(|| {
                ::scraper::selector::Selector::parse($selectors).unwrap()
            });
        &SELECTOR
    }};
    ($selectors:literal,) => {
        $crate::select!($selectors)
    };
}

#[macro_export]
macro_rules! assert_matches {
    ($expr:expr => $pat:pat) => {
        assert!(
            match $expr {
                $pat => true,
                _ => false,
            },
            "{} did not match {}",
            stringify!($expr),
            stringify!($pat)
        );
    };
}
