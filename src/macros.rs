// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Record literal: `record! { "title" => "SDR", "company" => "Acme" }`
#[macro_export]
macro_rules! record {
    () => {
        $crate::record::Record::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut r = $crate::record::Record::new();
        $(
            r.set($field, $value);
        )+
        r
    }};
}
