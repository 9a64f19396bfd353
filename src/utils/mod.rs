//! The `utils` module provides the error types and logging setup shared
//! across `signal-relay`.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests {
    use super::error::{DispatchError, RelayError, Rejection};
    use super::logging;
    use crate::transport::message::MessageKind;

    #[test]
    fn logging_init_accepts_levels() {
        logging::init("info");
        logging::init("DEBUG");
        logging::init("not-a-level");
    }

    #[test]
    fn only_transport_errors_are_fatal() {
        let rejected = DispatchError::rejected(MessageKind::Subscribe, Rejection::TopicCount(2));
        assert!(!rejected.is_fatal());

        let malformed = DispatchError::from(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(!malformed.is_fatal());

        let transport = DispatchError::from(RelayError::ConnectionClosed);
        assert!(transport.is_fatal());
    }

    #[test]
    fn rejection_messages_name_the_topic() {
        let err = DispatchError::rejected(
            MessageKind::Publish,
            Rejection::NotSubscribed("room1".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "rejected publish message: not subscribed to 'room1'"
        );
    }
}
