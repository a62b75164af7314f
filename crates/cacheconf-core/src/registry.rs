//! Directive Registry
//!
//! Static, read-only table mapping directive names (case-sensitive, exact
//! match) to the value shape they accept and the action they perform. The
//! parser validates shape against the descriptor before the action runs, so
//! actions only deal with semantic checks.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::behavior::Behavior;

/// How many values a directive takes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    OneOrMore,
}

/// Declared type of a directive's values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    /// Bare enumerated keyword, resolved by the action
    Keyword,
}

/// What a directive does once its shape is valid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Set a boolean behavior
    Flag(Behavior),
    /// Store an integer behavior
    Tunable(Behavior),
    Server,
    Servers,
    Socket,
    ConfigureFile,
    Namespace,
    Hash,
    Distribution,
    Reset,
    End,
    UserError,
}

#[derive(Clone, Copy, Debug)]
pub struct Directive {
    pub name: &'static str,
    pub arity: Arity,
    pub value_type: ValueType,
    pub action: Action,
}

const fn flag(name: &'static str, behavior: Behavior) -> Directive {
    Directive {
        name,
        arity: Arity::None,
        value_type: ValueType::String,
        action: Action::Flag(behavior),
    }
}

const fn tunable(name: &'static str, behavior: Behavior) -> Directive {
    Directive {
        name,
        arity: Arity::One,
        value_type: ValueType::Integer,
        action: Action::Tunable(behavior),
    }
}

const fn directive(
    name: &'static str,
    arity: Arity,
    value_type: ValueType,
    action: Action,
) -> Directive {
    Directive {
        name,
        arity,
        value_type,
        action,
    }
}

pub static DIRECTIVES: &[Directive] = &[
    // Servers
    directive("SERVER", Arity::One, ValueType::String, Action::Server),
    directive("SERVERS", Arity::OneOrMore, ValueType::String, Action::Servers),
    directive("SOCKET", Arity::One, ValueType::String, Action::Socket),
    // Configuration
    directive(
        "CONFIGURE-FILE",
        Arity::One,
        ValueType::String,
        Action::ConfigureFile,
    ),
    directive("NAMESPACE", Arity::One, ValueType::String, Action::Namespace),
    directive("HASH", Arity::One, ValueType::Keyword, Action::Hash),
    directive(
        "DISTRIBUTION",
        Arity::One,
        ValueType::Keyword,
        Action::Distribution,
    ),
    // Flags
    flag("BINARY-PROTOCOL", Behavior::BinaryProtocol),
    flag("BUFFER-REQUESTS", Behavior::BufferRequests),
    flag("HASH-WITH-NAMESPACE", Behavior::HashWithNamespace),
    flag("NOREPLY", Behavior::NoReply),
    flag("RANDOMIZE-REPLICA-READ", Behavior::RandomizeReplicaRead),
    flag("SORT-HOSTS", Behavior::SortHosts),
    flag("SUPPORT-CAS", Behavior::SupportCas),
    flag("TCP-NODELAY", Behavior::TcpNodelay),
    flag("TCP-KEEPALIVE", Behavior::TcpKeepalive),
    flag("USE-UDP", Behavior::UseUdp),
    flag("VERIFY-KEY", Behavior::VerifyKey),
    flag("REMOVE-FAILED-SERVERS", Behavior::RemoveFailedServers),
    // Tunables
    tunable("CONNECT-TIMEOUT", Behavior::ConnectTimeout),
    tunable("POLL-TIMEOUT", Behavior::PollTimeout),
    tunable("RCV-TIMEOUT", Behavior::RcvTimeout),
    tunable("SND-TIMEOUT", Behavior::SndTimeout),
    tunable("RETRY-TIMEOUT", Behavior::RetryTimeout),
    tunable("SERVER-FAILURE-LIMIT", Behavior::ServerFailureLimit),
    tunable("IO-MSG-WATERMARK", Behavior::IoMsgWatermark),
    tunable("IO-BYTES-WATERMARK", Behavior::IoBytesWatermark),
    tunable("IO-KEY-PREFETCH", Behavior::IoKeyPrefetch),
    tunable("NUMBER-OF-REPLICAS", Behavior::NumberOfReplicas),
    tunable("SOCKET-SEND-SIZE", Behavior::SocketSendSize),
    tunable("SOCKET-RECV-SIZE", Behavior::SocketRecvSize),
    tunable("TCP-KEEPIDLE", Behavior::TcpKeepidle),
    // Control
    directive("RESET", Arity::None, ValueType::String, Action::Reset),
    directive("END", Arity::None, ValueType::String, Action::End),
    directive("ERROR", Arity::None, ValueType::String, Action::UserError),
];

static INDEX: Lazy<HashMap<&'static str, &'static Directive>> =
    Lazy::new(|| DIRECTIVES.iter().map(|d| (d.name, d)).collect());

/// Exact, case-sensitive lookup
pub fn lookup(name: &str) -> Option<&'static Directive> {
    INDEX.get(name).copied()
}

/// All directive names, in table order
pub fn names() -> impl Iterator<Item = &'static str> {
    DIRECTIVES.iter().map(|d| d.name)
}
