use crate::message::MessageError;

#[cfg(test)]
use pretty_assertions::assert_eq;

#[test]
fn test_message_error() {
    let e = MessageError::PartCount("NOMINATE body", 2, 1);
    assert_eq!("malformed NOMINATE body: need 2 parts, but:1", format!("{}", e));

    let e = MessageError::BadInt("INVITE round", "x".into());
    assert_eq!(
        "malformed INVITE round: not an unsigned integer: \"x\"",
        format!("{}", e)
    );

    let e = MessageError::UnknownCommand("x".into());
    assert_eq!("unknown command: \"x\"", format!("{}", e));

    let e = MessageError::BadPeer("?".into());
    assert_eq!("malformed sender: \"?\"", format!("{}", e));
}
