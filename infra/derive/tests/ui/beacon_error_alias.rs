use beacon_derive::beacon_error;
use std::borrow::Cow;

#[beacon_error]
pub enum Fault {
    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn check(flag: bool) -> FaultResult<u8> {
    if flag {
        Ok(1)
    } else {
        Err(Fault::Rejected { message: "flag unset".into(), context: None })
    }
}

fn main() {
    assert_eq!(check(true).ok(), Some(1));
    assert!(check(false).is_err());
}
