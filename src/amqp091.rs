//! Built-in AMQP 0-9-1 metadata (RabbitMQ flavour).
//!
//! [`spec()`] parses the bundled protocol document on first use and keeps
//! the result for the life of the process. The constants below mirror the
//! document; the tests in this module check each of them against it.
//!
//! # Example
//!
//! ```
//! use amqp_codec::amqp091;
//! use amqp_codec::spec::ExceptionCategory;
//!
//! let spec = amqp091::spec();
//! assert_eq!(spec.method_name(amqp091::BASIC_PUBLISH), Some("basic.publish"));
//! assert!(spec.has_content(amqp091::BASIC_DELIVER));
//! assert_eq!(spec.exception_category(amqp091::NOT_FOUND), ExceptionCategory::Channel);
//! ```

use std::sync::OnceLock;

use crate::codec::Codec;
use crate::spec::{MethodNumber, ProtocolSpec};

const DEFINITION: &str = include_str!("amqp0-9-1.json");

static SPEC: OnceLock<ProtocolSpec> = OnceLock::new();

/// The built-in metadata table.
pub fn spec() -> &'static ProtocolSpec {
    SPEC.get_or_init(|| {
        ProtocolSpec::from_json(DEFINITION).expect("bundled AMQP 0-9-1 definition is valid")
    })
}

/// A codec over the built-in table with the default configuration.
pub fn codec() -> Codec<'static> {
    Codec::new(spec())
}

/// Protocol major version.
pub const PROTOCOL_VERSION_MAJOR: u8 = 0;
/// Protocol minor version.
pub const PROTOCOL_VERSION_MINOR: u8 = 9;
/// Protocol revision.
pub const PROTOCOL_VERSION_REVISION: u8 = 1;
/// Default TCP port.
pub const PORT: u16 = 5672;
/// Default TLS port.
pub const TLS_PORT: u16 = 5671;

/// Protocol header sent by a client before the first frame.
pub const PROTOCOL_HEADER: [u8; 8] = [
    b'A',
    b'M',
    b'Q',
    b'P',
    0,
    PROTOCOL_VERSION_MAJOR,
    PROTOCOL_VERSION_MINOR,
    PROTOCOL_VERSION_REVISION,
];

/// Frame type of method frames.
pub const FRAME_METHOD: u8 = 1;
/// Frame type of content header frames.
pub const FRAME_HEADER: u8 = 2;
/// Frame type of content body frames.
pub const FRAME_BODY: u8 = 3;
/// Frame type of heartbeat frames.
pub const FRAME_HEARTBEAT: u8 = 8;
/// Smallest `frame-max` a peer may negotiate.
pub const FRAME_MIN_SIZE: u32 = 4096;
/// Octet terminating every frame.
pub const FRAME_END: u8 = 206;

/// `REPLY-SUCCESS`
pub const REPLY_SUCCESS: u16 = 200;
/// `CONTENT-TOO-LARGE` (soft)
pub const CONTENT_TOO_LARGE: u16 = 311;
/// `NO-ROUTE` (soft)
pub const NO_ROUTE: u16 = 312;
/// `NO-CONSUMERS` (soft)
pub const NO_CONSUMERS: u16 = 313;
/// `CONNECTION-FORCED` (hard)
pub const CONNECTION_FORCED: u16 = 320;
/// `INVALID-PATH` (hard)
pub const INVALID_PATH: u16 = 402;
/// `ACCESS-REFUSED` (soft)
pub const ACCESS_REFUSED: u16 = 403;
/// `NOT-FOUND` (soft)
pub const NOT_FOUND: u16 = 404;
/// `RESOURCE-LOCKED` (soft)
pub const RESOURCE_LOCKED: u16 = 405;
/// `PRECONDITION-FAILED` (soft)
pub const PRECONDITION_FAILED: u16 = 406;
/// `FRAME-ERROR` (hard)
pub const FRAME_ERROR: u16 = 501;
/// `SYNTAX-ERROR` (hard)
pub const SYNTAX_ERROR: u16 = 502;
/// `COMMAND-INVALID` (hard)
pub const COMMAND_INVALID: u16 = 503;
/// `CHANNEL-ERROR` (hard)
pub const CHANNEL_ERROR: u16 = 504;
/// `UNEXPECTED-FRAME` (hard)
pub const UNEXPECTED_FRAME: u16 = 505;
/// `RESOURCE-ERROR` (hard)
pub const RESOURCE_ERROR: u16 = 506;
/// `NOT-ALLOWED` (hard)
pub const NOT_ALLOWED: u16 = 530;
/// `NOT-IMPLEMENTED` (hard)
pub const NOT_IMPLEMENTED: u16 = 540;
/// `INTERNAL-ERROR` (hard)
pub const INTERNAL_ERROR: u16 = 541;

/// Class id of `basic`, the only class with content properties.
pub const BASIC_CLASS_ID: u16 = 60;

// connection
/// `connection.start`
pub const CONNECTION_START: MethodNumber = MethodNumber::new(10, 10);
/// `connection.start-ok`
pub const CONNECTION_START_OK: MethodNumber = MethodNumber::new(10, 11);
/// `connection.secure`
pub const CONNECTION_SECURE: MethodNumber = MethodNumber::new(10, 20);
/// `connection.secure-ok`
pub const CONNECTION_SECURE_OK: MethodNumber = MethodNumber::new(10, 21);
/// `connection.tune`
pub const CONNECTION_TUNE: MethodNumber = MethodNumber::new(10, 30);
/// `connection.tune-ok`
pub const CONNECTION_TUNE_OK: MethodNumber = MethodNumber::new(10, 31);
/// `connection.open`
pub const CONNECTION_OPEN: MethodNumber = MethodNumber::new(10, 40);
/// `connection.open-ok`
pub const CONNECTION_OPEN_OK: MethodNumber = MethodNumber::new(10, 41);
/// `connection.close`
pub const CONNECTION_CLOSE: MethodNumber = MethodNumber::new(10, 50);
/// `connection.close-ok`
pub const CONNECTION_CLOSE_OK: MethodNumber = MethodNumber::new(10, 51);
/// `connection.blocked`
pub const CONNECTION_BLOCKED: MethodNumber = MethodNumber::new(10, 60);
/// `connection.unblocked`
pub const CONNECTION_UNBLOCKED: MethodNumber = MethodNumber::new(10, 61);
/// `connection.update-secret`
pub const CONNECTION_UPDATE_SECRET: MethodNumber = MethodNumber::new(10, 70);
/// `connection.update-secret-ok`
pub const CONNECTION_UPDATE_SECRET_OK: MethodNumber = MethodNumber::new(10, 71);

// channel
/// `channel.open`
pub const CHANNEL_OPEN: MethodNumber = MethodNumber::new(20, 10);
/// `channel.open-ok`
pub const CHANNEL_OPEN_OK: MethodNumber = MethodNumber::new(20, 11);
/// `channel.flow`
pub const CHANNEL_FLOW: MethodNumber = MethodNumber::new(20, 20);
/// `channel.flow-ok`
pub const CHANNEL_FLOW_OK: MethodNumber = MethodNumber::new(20, 21);
/// `channel.close`
pub const CHANNEL_CLOSE: MethodNumber = MethodNumber::new(20, 40);
/// `channel.close-ok`
pub const CHANNEL_CLOSE_OK: MethodNumber = MethodNumber::new(20, 41);

// access
/// `access.request`
pub const ACCESS_REQUEST: MethodNumber = MethodNumber::new(30, 10);
/// `access.request-ok`
pub const ACCESS_REQUEST_OK: MethodNumber = MethodNumber::new(30, 11);

// exchange
/// `exchange.declare`
pub const EXCHANGE_DECLARE: MethodNumber = MethodNumber::new(40, 10);
/// `exchange.declare-ok`
pub const EXCHANGE_DECLARE_OK: MethodNumber = MethodNumber::new(40, 11);
/// `exchange.delete`
pub const EXCHANGE_DELETE: MethodNumber = MethodNumber::new(40, 20);
/// `exchange.delete-ok`
pub const EXCHANGE_DELETE_OK: MethodNumber = MethodNumber::new(40, 21);
/// `exchange.bind`
pub const EXCHANGE_BIND: MethodNumber = MethodNumber::new(40, 30);
/// `exchange.bind-ok`
pub const EXCHANGE_BIND_OK: MethodNumber = MethodNumber::new(40, 31);
/// `exchange.unbind`
pub const EXCHANGE_UNBIND: MethodNumber = MethodNumber::new(40, 40);
/// `exchange.unbind-ok`
pub const EXCHANGE_UNBIND_OK: MethodNumber = MethodNumber::new(40, 51);

// queue
/// `queue.declare`
pub const QUEUE_DECLARE: MethodNumber = MethodNumber::new(50, 10);
/// `queue.declare-ok`
pub const QUEUE_DECLARE_OK: MethodNumber = MethodNumber::new(50, 11);
/// `queue.bind`
pub const QUEUE_BIND: MethodNumber = MethodNumber::new(50, 20);
/// `queue.bind-ok`
pub const QUEUE_BIND_OK: MethodNumber = MethodNumber::new(50, 21);
/// `queue.purge`
pub const QUEUE_PURGE: MethodNumber = MethodNumber::new(50, 30);
/// `queue.purge-ok`
pub const QUEUE_PURGE_OK: MethodNumber = MethodNumber::new(50, 31);
/// `queue.delete`
pub const QUEUE_DELETE: MethodNumber = MethodNumber::new(50, 40);
/// `queue.delete-ok`
pub const QUEUE_DELETE_OK: MethodNumber = MethodNumber::new(50, 41);
/// `queue.unbind`
pub const QUEUE_UNBIND: MethodNumber = MethodNumber::new(50, 50);
/// `queue.unbind-ok`
pub const QUEUE_UNBIND_OK: MethodNumber = MethodNumber::new(50, 51);

// basic
/// `basic.qos`
pub const BASIC_QOS: MethodNumber = MethodNumber::new(60, 10);
/// `basic.qos-ok`
pub const BASIC_QOS_OK: MethodNumber = MethodNumber::new(60, 11);
/// `basic.consume`
pub const BASIC_CONSUME: MethodNumber = MethodNumber::new(60, 20);
/// `basic.consume-ok`
pub const BASIC_CONSUME_OK: MethodNumber = MethodNumber::new(60, 21);
/// `basic.cancel`
pub const BASIC_CANCEL: MethodNumber = MethodNumber::new(60, 30);
/// `basic.cancel-ok`
pub const BASIC_CANCEL_OK: MethodNumber = MethodNumber::new(60, 31);
/// `basic.publish`
pub const BASIC_PUBLISH: MethodNumber = MethodNumber::new(60, 40);
/// `basic.return`
pub const BASIC_RETURN: MethodNumber = MethodNumber::new(60, 50);
/// `basic.deliver`
pub const BASIC_DELIVER: MethodNumber = MethodNumber::new(60, 60);
/// `basic.get`
pub const BASIC_GET: MethodNumber = MethodNumber::new(60, 70);
/// `basic.get-ok`
pub const BASIC_GET_OK: MethodNumber = MethodNumber::new(60, 71);
/// `basic.get-empty`
pub const BASIC_GET_EMPTY: MethodNumber = MethodNumber::new(60, 72);
/// `basic.ack`
pub const BASIC_ACK: MethodNumber = MethodNumber::new(60, 80);
/// `basic.reject`
pub const BASIC_REJECT: MethodNumber = MethodNumber::new(60, 90);
/// `basic.recover-async`
pub const BASIC_RECOVER_ASYNC: MethodNumber = MethodNumber::new(60, 100);
/// `basic.recover`
pub const BASIC_RECOVER: MethodNumber = MethodNumber::new(60, 110);
/// `basic.recover-ok`
pub const BASIC_RECOVER_OK: MethodNumber = MethodNumber::new(60, 111);
/// `basic.nack`
pub const BASIC_NACK: MethodNumber = MethodNumber::new(60, 120);

// confirm
/// `confirm.select`
pub const CONFIRM_SELECT: MethodNumber = MethodNumber::new(85, 10);
/// `confirm.select-ok`
pub const CONFIRM_SELECT_OK: MethodNumber = MethodNumber::new(85, 11);

// tx
/// `tx.select`
pub const TX_SELECT: MethodNumber = MethodNumber::new(90, 10);
/// `tx.select-ok`
pub const TX_SELECT_OK: MethodNumber = MethodNumber::new(90, 11);
/// `tx.commit`
pub const TX_COMMIT: MethodNumber = MethodNumber::new(90, 20);
/// `tx.commit-ok`
pub const TX_COMMIT_OK: MethodNumber = MethodNumber::new(90, 21);
/// `tx.rollback`
pub const TX_ROLLBACK: MethodNumber = MethodNumber::new(90, 30);
/// `tx.rollback-ok`
pub const TX_ROLLBACK_OK: MethodNumber = MethodNumber::new(90, 31);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ExceptionCategory, PrimitiveType};

    const METHODS: &[(MethodNumber, &str)] = &[
        (CONNECTION_START, "connection.start"),
        (CONNECTION_START_OK, "connection.start-ok"),
        (CONNECTION_SECURE, "connection.secure"),
        (CONNECTION_SECURE_OK, "connection.secure-ok"),
        (CONNECTION_TUNE, "connection.tune"),
        (CONNECTION_TUNE_OK, "connection.tune-ok"),
        (CONNECTION_OPEN, "connection.open"),
        (CONNECTION_OPEN_OK, "connection.open-ok"),
        (CONNECTION_CLOSE, "connection.close"),
        (CONNECTION_CLOSE_OK, "connection.close-ok"),
        (CONNECTION_BLOCKED, "connection.blocked"),
        (CONNECTION_UNBLOCKED, "connection.unblocked"),
        (CONNECTION_UPDATE_SECRET, "connection.update-secret"),
        (CONNECTION_UPDATE_SECRET_OK, "connection.update-secret-ok"),
        (CHANNEL_OPEN, "channel.open"),
        (CHANNEL_OPEN_OK, "channel.open-ok"),
        (CHANNEL_FLOW, "channel.flow"),
        (CHANNEL_FLOW_OK, "channel.flow-ok"),
        (CHANNEL_CLOSE, "channel.close"),
        (CHANNEL_CLOSE_OK, "channel.close-ok"),
        (ACCESS_REQUEST, "access.request"),
        (ACCESS_REQUEST_OK, "access.request-ok"),
        (EXCHANGE_DECLARE, "exchange.declare"),
        (EXCHANGE_DECLARE_OK, "exchange.declare-ok"),
        (EXCHANGE_DELETE, "exchange.delete"),
        (EXCHANGE_DELETE_OK, "exchange.delete-ok"),
        (EXCHANGE_BIND, "exchange.bind"),
        (EXCHANGE_BIND_OK, "exchange.bind-ok"),
        (EXCHANGE_UNBIND, "exchange.unbind"),
        (EXCHANGE_UNBIND_OK, "exchange.unbind-ok"),
        (QUEUE_DECLARE, "queue.declare"),
        (QUEUE_DECLARE_OK, "queue.declare-ok"),
        (QUEUE_BIND, "queue.bind"),
        (QUEUE_BIND_OK, "queue.bind-ok"),
        (QUEUE_PURGE, "queue.purge"),
        (QUEUE_PURGE_OK, "queue.purge-ok"),
        (QUEUE_DELETE, "queue.delete"),
        (QUEUE_DELETE_OK, "queue.delete-ok"),
        (QUEUE_UNBIND, "queue.unbind"),
        (QUEUE_UNBIND_OK, "queue.unbind-ok"),
        (BASIC_QOS, "basic.qos"),
        (BASIC_QOS_OK, "basic.qos-ok"),
        (BASIC_CONSUME, "basic.consume"),
        (BASIC_CONSUME_OK, "basic.consume-ok"),
        (BASIC_CANCEL, "basic.cancel"),
        (BASIC_CANCEL_OK, "basic.cancel-ok"),
        (BASIC_PUBLISH, "basic.publish"),
        (BASIC_RETURN, "basic.return"),
        (BASIC_DELIVER, "basic.deliver"),
        (BASIC_GET, "basic.get"),
        (BASIC_GET_OK, "basic.get-ok"),
        (BASIC_GET_EMPTY, "basic.get-empty"),
        (BASIC_ACK, "basic.ack"),
        (BASIC_REJECT, "basic.reject"),
        (BASIC_RECOVER_ASYNC, "basic.recover-async"),
        (BASIC_RECOVER, "basic.recover"),
        (BASIC_RECOVER_OK, "basic.recover-ok"),
        (BASIC_NACK, "basic.nack"),
        (CONFIRM_SELECT, "confirm.select"),
        (CONFIRM_SELECT_OK, "confirm.select-ok"),
        (TX_SELECT, "tx.select"),
        (TX_SELECT_OK, "tx.select-ok"),
        (TX_COMMIT, "tx.commit"),
        (TX_COMMIT_OK, "tx.commit-ok"),
        (TX_ROLLBACK, "tx.rollback"),
        (TX_ROLLBACK_OK, "tx.rollback-ok"),
    ];

    #[test]
    fn test_builtin_spec_loads() {
        let spec = spec();
        assert_eq!(
            spec.version(),
            (
                PROTOCOL_VERSION_MAJOR,
                PROTOCOL_VERSION_MINOR,
                PROTOCOL_VERSION_REVISION
            )
        );
        assert_eq!(spec.port(), PORT);
        assert_eq!(spec.classes().count(), 8);
        assert!(std::ptr::eq(spec, super::spec()));
    }

    #[test]
    fn test_method_constants_match_metadata() {
        for &(number, name) in METHODS {
            assert_eq!(spec().method_name(number), Some(name), "{}", number);
            assert_eq!(spec().method_number(name), Some(number));
        }
        assert_eq!(spec().methods().count(), METHODS.len());
    }

    #[test]
    fn test_content_methods() {
        let with_content: Vec<_> = spec()
            .methods()
            .filter(|m| m.has_content)
            .map(|m| m.number)
            .collect();
        assert_eq!(
            with_content,
            vec![BASIC_PUBLISH, BASIC_RETURN, BASIC_DELIVER, BASIC_GET_OK]
        );
    }

    #[test]
    fn test_frame_constants_match_metadata() {
        let spec = spec();
        assert_eq!(spec.constant("FRAME-METHOD"), Some(u32::from(FRAME_METHOD)));
        assert_eq!(spec.constant("FRAME-HEADER"), Some(u32::from(FRAME_HEADER)));
        assert_eq!(spec.constant("FRAME-BODY"), Some(u32::from(FRAME_BODY)));
        assert_eq!(
            spec.constant("FRAME-HEARTBEAT"),
            Some(u32::from(FRAME_HEARTBEAT))
        );
        assert_eq!(spec.constant("FRAME-MIN-SIZE"), Some(FRAME_MIN_SIZE));
        assert_eq!(spec.constant("FRAME-END"), Some(u32::from(FRAME_END)));
        assert_eq!(spec.constant("REPLY-SUCCESS"), Some(u32::from(REPLY_SUCCESS)));
    }

    #[test]
    fn test_reply_codes_and_categories() {
        let soft = [
            (CONTENT_TOO_LARGE, "CONTENT-TOO-LARGE"),
            (NO_ROUTE, "NO-ROUTE"),
            (NO_CONSUMERS, "NO-CONSUMERS"),
            (ACCESS_REFUSED, "ACCESS-REFUSED"),
            (NOT_FOUND, "NOT-FOUND"),
            (RESOURCE_LOCKED, "RESOURCE-LOCKED"),
            (PRECONDITION_FAILED, "PRECONDITION-FAILED"),
        ];
        let hard = [
            (CONNECTION_FORCED, "CONNECTION-FORCED"),
            (INVALID_PATH, "INVALID-PATH"),
            (FRAME_ERROR, "FRAME-ERROR"),
            (SYNTAX_ERROR, "SYNTAX-ERROR"),
            (COMMAND_INVALID, "COMMAND-INVALID"),
            (CHANNEL_ERROR, "CHANNEL-ERROR"),
            (UNEXPECTED_FRAME, "UNEXPECTED-FRAME"),
            (RESOURCE_ERROR, "RESOURCE-ERROR"),
            (NOT_ALLOWED, "NOT-ALLOWED"),
            (NOT_IMPLEMENTED, "NOT-IMPLEMENTED"),
            (INTERNAL_ERROR, "INTERNAL-ERROR"),
        ];
        let spec = spec();
        for (code, name) in soft {
            assert_eq!(spec.constant(name), Some(u32::from(code)));
            assert_eq!(spec.exception_category(code), ExceptionCategory::Channel);
        }
        for (code, name) in hard {
            assert_eq!(spec.constant(name), Some(u32::from(code)));
            assert_eq!(spec.exception_category(code), ExceptionCategory::Connection);
        }
        assert_eq!(
            spec.exception_category(REPLY_SUCCESS),
            ExceptionCategory::Unknown
        );
    }

    #[test]
    fn test_basic_properties() {
        let basic = spec().class(BASIC_CLASS_ID).unwrap();
        let names: Vec<_> = basic.properties.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "content-type",
                "content-encoding",
                "headers",
                "delivery-mode",
                "priority",
                "correlation-id",
                "reply-to",
                "expiration",
                "message-id",
                "timestamp",
                "type",
                "user-id",
                "app-id",
                "cluster-id",
            ]
        );
        assert_eq!(basic.property("content-type").unwrap().flag, 0x8000);
        assert_eq!(basic.property("cluster-id").unwrap().flag, 0x0004);
        assert_eq!(
            basic.property("headers").unwrap().primitive,
            PrimitiveType::Table
        );
        for class in spec().classes().filter(|c| c.id != BASIC_CLASS_ID) {
            assert!(class.properties.is_empty(), "{}", class.name);
        }
    }

    #[test]
    fn test_domains() {
        let spec = spec();
        assert_eq!(spec.resolve("peer-properties").unwrap(), PrimitiveType::Table);
        assert_eq!(spec.resolve("delivery-tag").unwrap(), PrimitiveType::LongLong);
        assert_eq!(spec.resolve("no-wait").unwrap(), PrimitiveType::Bit);
        assert_eq!(spec.resolve("path").unwrap(), PrimitiveType::ShortStr);
    }

    #[test]
    fn test_protocol_header() {
        assert_eq!(&PROTOCOL_HEADER, b"AMQP\x00\x00\x09\x01");
    }
}
