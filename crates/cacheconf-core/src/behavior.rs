//! Behavior flags, tunables, and the enumerated hashing settings a handle
//! carries. This is the surface directives ultimately apply to; the
//! protocol, hashing and pool machinery read it back.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Settings addressable through `behavior_set` / `behavior_get`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    // =========================================================================
    // Flags (0 or 1)
    // =========================================================================
    BinaryProtocol,
    BufferRequests,
    HashWithNamespace,
    NoReply,
    RandomizeReplicaRead,
    SortHosts,
    SupportCas,
    TcpNodelay,
    TcpKeepalive,
    UseUdp,
    VerifyKey,
    RemoveFailedServers,
    /// Set when a configuration file was requested by the parsed text
    LoadFromFile,

    // =========================================================================
    // Tunables
    // =========================================================================
    ConnectTimeout,
    PollTimeout,
    RcvTimeout,
    SndTimeout,
    RetryTimeout,
    ServerFailureLimit,
    IoMsgWatermark,
    IoBytesWatermark,
    IoKeyPrefetch,
    NumberOfReplicas,
    SocketSendSize,
    SocketRecvSize,
    TcpKeepidle,
}

impl Behavior {
    pub fn is_flag(self) -> bool {
        matches!(
            self,
            Behavior::BinaryProtocol
                | Behavior::BufferRequests
                | Behavior::HashWithNamespace
                | Behavior::NoReply
                | Behavior::RandomizeReplicaRead
                | Behavior::SortHosts
                | Behavior::SupportCas
                | Behavior::TcpNodelay
                | Behavior::TcpKeepalive
                | Behavior::UseUdp
                | Behavior::VerifyKey
                | Behavior::RemoveFailedServers
                | Behavior::LoadFromFile
        )
    }
}

/// Flag and tunable storage with client defaults
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behaviors {
    pub binary_protocol: bool,
    pub buffer_requests: bool,
    pub hash_with_namespace: bool,
    pub no_reply: bool,
    pub randomize_replica_read: bool,
    pub sort_hosts: bool,
    pub support_cas: bool,
    pub tcp_nodelay: bool,
    pub tcp_keepalive: bool,
    pub use_udp: bool,
    pub verify_key: bool,
    pub remove_failed_servers: bool,
    pub load_from_file: bool,

    /// Milliseconds
    pub connect_timeout: u64,
    /// Milliseconds
    pub poll_timeout: u64,
    /// Microseconds, 0 means the OS default
    pub rcv_timeout: u64,
    /// Microseconds, 0 means the OS default
    pub snd_timeout: u64,
    /// Seconds
    pub retry_timeout: u64,
    pub server_failure_limit: u64,
    pub io_msg_watermark: u64,
    pub io_bytes_watermark: u64,
    pub io_key_prefetch: u64,
    pub number_of_replicas: u64,
    pub socket_send_size: u64,
    pub socket_recv_size: u64,
    pub tcp_keepidle: u64,
}

impl Default for Behaviors {
    fn default() -> Self {
        Self {
            binary_protocol: false,
            buffer_requests: false,
            hash_with_namespace: false,
            no_reply: false,
            randomize_replica_read: false,
            sort_hosts: false,
            support_cas: false,
            tcp_nodelay: false,
            tcp_keepalive: false,
            use_udp: false,
            verify_key: false,
            remove_failed_servers: false,
            load_from_file: false,
            connect_timeout: 4000,
            poll_timeout: 5000,
            rcv_timeout: 0,
            snd_timeout: 0,
            retry_timeout: 2,
            server_failure_limit: 0,
            io_msg_watermark: 500,
            io_bytes_watermark: 65536,
            io_key_prefetch: 0,
            number_of_replicas: 0,
            socket_send_size: 0,
            socket_recv_size: 0,
            tcp_keepidle: 0,
        }
    }
}

impl Behaviors {
    pub fn get(&self, behavior: Behavior) -> u64 {
        match behavior {
            Behavior::BinaryProtocol => self.binary_protocol as u64,
            Behavior::BufferRequests => self.buffer_requests as u64,
            Behavior::HashWithNamespace => self.hash_with_namespace as u64,
            Behavior::NoReply => self.no_reply as u64,
            Behavior::RandomizeReplicaRead => self.randomize_replica_read as u64,
            Behavior::SortHosts => self.sort_hosts as u64,
            Behavior::SupportCas => self.support_cas as u64,
            Behavior::TcpNodelay => self.tcp_nodelay as u64,
            Behavior::TcpKeepalive => self.tcp_keepalive as u64,
            Behavior::UseUdp => self.use_udp as u64,
            Behavior::VerifyKey => self.verify_key as u64,
            Behavior::RemoveFailedServers => self.remove_failed_servers as u64,
            Behavior::LoadFromFile => self.load_from_file as u64,
            Behavior::ConnectTimeout => self.connect_timeout,
            Behavior::PollTimeout => self.poll_timeout,
            Behavior::RcvTimeout => self.rcv_timeout,
            Behavior::SndTimeout => self.snd_timeout,
            Behavior::RetryTimeout => self.retry_timeout,
            Behavior::ServerFailureLimit => self.server_failure_limit,
            Behavior::IoMsgWatermark => self.io_msg_watermark,
            Behavior::IoBytesWatermark => self.io_bytes_watermark,
            Behavior::IoKeyPrefetch => self.io_key_prefetch,
            Behavior::NumberOfReplicas => self.number_of_replicas,
            Behavior::SocketSendSize => self.socket_send_size,
            Behavior::SocketRecvSize => self.socket_recv_size,
            Behavior::TcpKeepidle => self.tcp_keepidle,
        }
    }

    /// Store `value`; flags treat any non-zero value as set
    pub fn set(&mut self, behavior: Behavior, value: u64) {
        let flag = value != 0;
        match behavior {
            Behavior::BinaryProtocol => self.binary_protocol = flag,
            Behavior::BufferRequests => self.buffer_requests = flag,
            Behavior::HashWithNamespace => self.hash_with_namespace = flag,
            Behavior::NoReply => self.no_reply = flag,
            Behavior::RandomizeReplicaRead => self.randomize_replica_read = flag,
            Behavior::SortHosts => self.sort_hosts = flag,
            Behavior::SupportCas => self.support_cas = flag,
            Behavior::TcpNodelay => self.tcp_nodelay = flag,
            Behavior::TcpKeepalive => self.tcp_keepalive = flag,
            Behavior::UseUdp => self.use_udp = flag,
            Behavior::VerifyKey => self.verify_key = flag,
            Behavior::RemoveFailedServers => self.remove_failed_servers = flag,
            Behavior::LoadFromFile => self.load_from_file = flag,
            Behavior::ConnectTimeout => self.connect_timeout = value,
            Behavior::PollTimeout => self.poll_timeout = value,
            Behavior::RcvTimeout => self.rcv_timeout = value,
            Behavior::SndTimeout => self.snd_timeout = value,
            Behavior::RetryTimeout => self.retry_timeout = value,
            Behavior::ServerFailureLimit => self.server_failure_limit = value,
            Behavior::IoMsgWatermark => self.io_msg_watermark = value,
            Behavior::IoBytesWatermark => self.io_bytes_watermark = value,
            Behavior::IoKeyPrefetch => self.io_key_prefetch = value,
            Behavior::NumberOfReplicas => self.number_of_replicas = value,
            Behavior::SocketSendSize => self.socket_send_size = value,
            Behavior::SocketRecvSize => self.socket_recv_size = value,
            Behavior::TcpKeepidle => self.tcp_keepidle = value,
        }
    }
}

/// Key hashing algorithm
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    Default,
    Md5,
    Crc,
    Fnv1_64,
    Fnv1a_64,
    Fnv1_32,
    Fnv1a_32,
    Hsieh,
    Murmur,
    Jenkins,
}

impl HashAlgorithm {
    pub fn keyword(self) -> &'static str {
        match self {
            HashAlgorithm::Default => "DEFAULT",
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Crc => "CRC",
            HashAlgorithm::Fnv1_64 => "FNV1_64",
            HashAlgorithm::Fnv1a_64 => "FNV1A_64",
            HashAlgorithm::Fnv1_32 => "FNV1_32",
            HashAlgorithm::Fnv1a_32 => "FNV1A_32",
            HashAlgorithm::Hsieh => "HSIEH",
            HashAlgorithm::Murmur => "MURMUR",
            HashAlgorithm::Jenkins => "JENKINS",
        }
    }
}

/// Keyword did not name a known value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownKeyword;

impl FromStr for HashAlgorithm {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hash = match s.to_ascii_uppercase().as_str() {
            "DEFAULT" => HashAlgorithm::Default,
            "MD5" => HashAlgorithm::Md5,
            "CRC" => HashAlgorithm::Crc,
            "FNV1_64" => HashAlgorithm::Fnv1_64,
            "FNV1A_64" => HashAlgorithm::Fnv1a_64,
            "FNV1_32" => HashAlgorithm::Fnv1_32,
            "FNV1A_32" => HashAlgorithm::Fnv1a_32,
            "HSIEH" => HashAlgorithm::Hsieh,
            "MURMUR" => HashAlgorithm::Murmur,
            "JENKINS" => HashAlgorithm::Jenkins,
            _ => return Err(UnknownKeyword),
        };
        Ok(hash)
    }
}

/// How keys are spread across the server list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    #[default]
    Modula,
    Consistent,
    Random,
    Ketama,
    KetamaWeighted,
}

impl Distribution {
    pub fn keyword(self) -> &'static str {
        match self {
            Distribution::Modula => "MODULA",
            Distribution::Consistent => "CONSISTENT",
            Distribution::Random => "RANDOM",
            Distribution::Ketama => "KETAMA",
            Distribution::KetamaWeighted => "KETAMA-WEIGHTED",
        }
    }
}

impl FromStr for Distribution {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let distribution = match s.to_ascii_uppercase().as_str() {
            "MODULA" => Distribution::Modula,
            "CONSISTENT" => Distribution::Consistent,
            "RANDOM" => Distribution::Random,
            "KETAMA" => Distribution::Ketama,
            "KETAMA-WEIGHTED" => Distribution::KetamaWeighted,
            _ => return Err(UnknownKeyword),
        };
        Ok(distribution)
    }
}
