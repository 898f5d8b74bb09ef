//! Opcode, xid-sentinel, and create-flag tables for the ZooKeeper wire
//! protocol, together with the fixed field widths used for length
//! preconditions.

/// Reserved xid values. A request whose xid matches one of these is a control
/// message rather than a data operation; ordinary data requests carry
/// positive, client-assigned xids.
pub mod xids {
    /// Session-establishment handshake. The connect request has no real xid;
    /// the protocol-version field (always 0) occupies its slot on the wire.
    pub const CONNECT: i32 = 0;
    /// Server-initiated watch notification. Only ever appears in responses.
    pub const WATCH: i32 = -1;
    /// Keep-alive ping.
    pub const PING: i32 = -2;
    /// Authentication exchange.
    pub const AUTH: i32 = -4;
    /// Legacy bulk watch registration sent right after connecting, when a
    /// client roams from one server to the next.
    pub const SET_WATCHES: i32 = -8;
}

/// Fixed wire widths, in bytes.
pub(crate) mod widths {
    pub const BOOL: usize = 1;
    pub const INT: usize = 4;
    pub const LONG: usize = 8;
    pub const XID: usize = 4;
    pub const OPCODE: usize = 4;
    pub const ZXID: usize = 8;
    pub const TIMEOUT: usize = 4;
    pub const SESSION: usize = 8;
    /// Transaction sub-header: opcode + done flag + error field.
    pub const MULTI_HEADER: usize = 9;
    pub const PROTOCOL_VERSION: usize = 4;
    /// Response header: xid + zxid + error.
    pub const SERVER_HEADER: usize = 16;
}

/// Operations defined by the protocol, tagged with their wire opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum OpCode {
    Connect = 0,
    Create = 1,
    Delete = 2,
    Exists = 3,
    GetData = 4,
    SetData = 5,
    GetAcl = 6,
    SetAcl = 7,
    GetChildren = 8,
    Sync = 9,
    Ping = 11,
    GetChildren2 = 12,
    Check = 13,
    Multi = 14,
    Create2 = 15,
    Reconfig = 16,
    CheckWatches = 17,
    RemoveWatches = 18,
    CreateContainer = 19,
    CreateTtl = 21,
    Close = -11,
    SetAuth = 100,
    SetWatches = 101,
    GetEphemerals = 103,
    GetAllChildrenNumber = 104,
}

impl TryFrom<i32> for OpCode {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, ()> {
        match value {
            0 => Ok(OpCode::Connect),
            1 => Ok(OpCode::Create),
            2 => Ok(OpCode::Delete),
            3 => Ok(OpCode::Exists),
            4 => Ok(OpCode::GetData),
            5 => Ok(OpCode::SetData),
            6 => Ok(OpCode::GetAcl),
            7 => Ok(OpCode::SetAcl),
            8 => Ok(OpCode::GetChildren),
            9 => Ok(OpCode::Sync),
            11 => Ok(OpCode::Ping),
            12 => Ok(OpCode::GetChildren2),
            13 => Ok(OpCode::Check),
            14 => Ok(OpCode::Multi),
            15 => Ok(OpCode::Create2),
            16 => Ok(OpCode::Reconfig),
            17 => Ok(OpCode::CheckWatches),
            18 => Ok(OpCode::RemoveWatches),
            19 => Ok(OpCode::CreateContainer),
            21 => Ok(OpCode::CreateTtl),
            -11 => Ok(OpCode::Close),
            100 => Ok(OpCode::SetAuth),
            101 => Ok(OpCode::SetWatches),
            103 => Ok(OpCode::GetEphemerals),
            104 => Ok(OpCode::GetAllChildrenNumber),
            _ => Err(()),
        }
    }
}

impl OpCode {
    /// Stable lowercase operation name for observability output.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Connect => "connect",
            OpCode::Create => "create",
            OpCode::Delete => "delete",
            OpCode::Exists => "exists",
            OpCode::GetData => "getdata",
            OpCode::SetData => "setdata",
            OpCode::GetAcl => "getacl",
            OpCode::SetAcl => "setacl",
            OpCode::GetChildren => "getchildren",
            OpCode::Sync => "sync",
            OpCode::Ping => "ping",
            OpCode::GetChildren2 => "getchildren2",
            OpCode::Check => "check",
            OpCode::Multi => "multi",
            OpCode::Create2 => "create2",
            OpCode::Reconfig => "reconfig",
            OpCode::CheckWatches => "checkwatches",
            OpCode::RemoveWatches => "removewatches",
            OpCode::CreateContainer => "createcontainer",
            OpCode::CreateTtl => "createttl",
            OpCode::Close => "close",
            OpCode::SetAuth => "auth",
            OpCode::SetWatches => "setwatches",
            OpCode::GetEphemerals => "getephemerals",
            OpCode::GetAllChildrenNumber => "getallchildrennumber",
        }
    }
}

/// Node-creation mode carried by the create family of requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CreateFlag {
    Persistent = 0,
    PersistentSequential = 1,
    Ephemeral = 2,
    EphemeralSequential = 3,
    Container = 4,
    PersistentWithTtl = 5,
    PersistentSequentialWithTtl = 6,
}

impl CreateFlag {
    /// Decodes a raw flags value. Values outside the enumeration yield `None`;
    /// they must not abort decoding, only render as `"unknown"`.
    pub fn from_wire(value: i32) -> Option<CreateFlag> {
        match value {
            0 => Some(CreateFlag::Persistent),
            1 => Some(CreateFlag::PersistentSequential),
            2 => Some(CreateFlag::Ephemeral),
            3 => Some(CreateFlag::EphemeralSequential),
            4 => Some(CreateFlag::Container),
            5 => Some(CreateFlag::PersistentWithTtl),
            6 => Some(CreateFlag::PersistentSequentialWithTtl),
            _ => None,
        }
    }

    /// Stable textual name for observability output.
    pub fn name(self) -> &'static str {
        match self {
            CreateFlag::Persistent => "persistent",
            CreateFlag::PersistentSequential => "persistent_sequential",
            CreateFlag::Ephemeral => "ephemeral",
            CreateFlag::EphemeralSequential => "ephemeral_sequential",
            CreateFlag::Container => "container",
            CreateFlag::PersistentWithTtl => "persistent_with_ttl",
            CreateFlag::PersistentSequentialWithTtl => "persistent_sequential_with_ttl",
        }
    }
}

/// Observability name for a raw create-flags value, `"unknown"` for values
/// outside the enumeration.
pub fn create_flag_name(value: i32) -> &'static str {
    CreateFlag::from_wire(value).map_or("unknown", CreateFlag::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_round_trips_through_wire_value() {
        for opcode in [
            OpCode::Connect,
            OpCode::Create,
            OpCode::Delete,
            OpCode::Exists,
            OpCode::GetData,
            OpCode::SetData,
            OpCode::GetAcl,
            OpCode::SetAcl,
            OpCode::GetChildren,
            OpCode::Sync,
            OpCode::Ping,
            OpCode::GetChildren2,
            OpCode::Check,
            OpCode::Multi,
            OpCode::Create2,
            OpCode::Reconfig,
            OpCode::CheckWatches,
            OpCode::RemoveWatches,
            OpCode::CreateContainer,
            OpCode::CreateTtl,
            OpCode::Close,
            OpCode::SetAuth,
            OpCode::SetWatches,
            OpCode::GetEphemerals,
            OpCode::GetAllChildrenNumber,
        ] {
            assert_eq!(OpCode::try_from(opcode as i32), Ok(opcode));
        }
    }

    #[test]
    fn test_unassigned_opcode_values_are_rejected() {
        for value in [10, 20, 22, 99, 102, 105, -1, -2, i32::MAX, i32::MIN] {
            assert_eq!(OpCode::try_from(value), Err(()));
        }
    }

    #[test]
    fn test_close_uses_negative_wire_value() {
        assert_eq!(OpCode::Close as i32, -11);
        assert_eq!(OpCode::try_from(-11), Ok(OpCode::Close));
    }

    #[test]
    fn test_create_flag_names() {
        assert_eq!(create_flag_name(0), "persistent");
        assert_eq!(create_flag_name(1), "persistent_sequential");
        assert_eq!(create_flag_name(2), "ephemeral");
        assert_eq!(create_flag_name(3), "ephemeral_sequential");
        assert_eq!(create_flag_name(4), "container");
        assert_eq!(create_flag_name(5), "persistent_with_ttl");
        assert_eq!(create_flag_name(6), "persistent_sequential_with_ttl");
    }

    #[test]
    fn test_out_of_range_create_flag_is_unknown() {
        assert_eq!(CreateFlag::from_wire(7), None);
        assert_eq!(CreateFlag::from_wire(-1), None);
        assert_eq!(create_flag_name(7), "unknown");
        assert_eq!(create_flag_name(1234), "unknown");
    }

    #[test]
    fn test_opcode_names_are_stable() {
        assert_eq!(OpCode::GetData.name(), "getdata");
        assert_eq!(OpCode::SetAuth.name(), "auth");
        assert_eq!(OpCode::GetAllChildrenNumber.name(), "getallchildrennumber");
        assert_eq!(OpCode::Create2.name(), "create2");
    }
}
