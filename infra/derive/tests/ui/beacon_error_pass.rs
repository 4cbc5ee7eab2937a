use beacon_derive::beacon_error;
use std::borrow::Cow;

#[beacon_error]
pub enum StoreError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> StoreResult<String> {
    std::fs::read_to_string("/definitely/not/here").context("Reading fixture")
}

fn main() {
    let err = read().expect_err("missing file");
    assert!(err.to_string().contains("(Reading fixture)"));

    let internal: StoreError = "boom".into();
    let with_context: Result<(), StoreError> = Err(internal);
    let err = with_context.context("outer").expect_err("still an error");
    assert_eq!(err.to_string(), "Internal store error (outer): boom");
}
