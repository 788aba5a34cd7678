use std::fmt::Display;

use axum::response::IntoResponse;
use serde_json::{json, Value};

/// Generate example values for OAPI documentation.
macro_rules! generate_examples {
    ($name:ident, $type:ty, $expr:expr) => {
        ::paste::paste! {
            #[doc = concat!("Generate example [`", stringify!($type), "`] value for OAPI documentation.")]
            pub(crate) fn [<example_ $name>]() -> $type {
                $expr
            }
        }
    };

    ($name:ident, $type:ty, $expr:expr; $($name_repeat:ident, $type_repeat:ty, $expr_repeat:expr);+) => {
        generate_examples!($name, $type, $expr);
        generate_examples!($($name_repeat, $type_repeat, $expr_repeat);+);
    }
}

/// Convert an error into a JSON value suitable for OAPI documentation.
pub(crate) fn example_error<E: Display + IntoResponse>(err: E) -> Value {
    let error = err.to_string();

    json! {{
        "code": err.into_response().status().as_u16(),
        "error": error,
    }}
}

generate_examples!(
    code_id, String, String::from("0b5a3c1e-7f4d-4c2b-9a8e-2d6f1e3b5c7a");
    slug, Option<String>, Some(String::from("spring-menu"));
    name, String, String::from("Spring menu");
    description, Option<String>, Some(String::from("Table stand code for the spring menu."));
    target_url, String, String::from("https://example.com/menu/spring");
    payload, String, String::from("https://codes.example.com/scan/0b5a3c1e-7f4d-4c2b-9a8e-2d6f1e3b5c7a");
    creator_id, Option<String>, Some(String::from("user_2b4c6d"));
    fingerprint, String, String::from("5f2c1a9e");
    count, i64, 12;
    timestamp, i64, 1672531200;
    style_path, String, String::from("dots_options.color");
    style_value, Value, json!("#1a1a1a");
    settings, Value, json!({
        "width": 300,
        "height": 300,
        "dots_options": { "color": "#1a1a1a", "type": "rounded" },
        "qr_options": { "error_correction_level": "Q" }
    })
);
