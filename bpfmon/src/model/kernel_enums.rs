//! Kernel enum tables
//!
//! Every numbered kernel enum is a transparent `u32` newtype. Values outside the
//! table are kept as-is and displayed as `TypeName(N)`, so records produced by
//! newer kernels still decode.

use serde::{Serialize, Serializer};
use std::fmt;

/// Compare two enum names ignoring ASCII case and underscores
///
/// `bpf_map_lookup_elem`, `BPF_MAP_LOOKUP_ELEM` and `BpfMapLookupElem` all match.
fn names_match(table_name: &str, candidate: &str) -> bool {
    let normalize = |s: &str| {
        s.chars().filter(|c| *c != '_').map(|c| c.to_ascii_lowercase()).collect::<String>()
    };
    normalize(table_name) == normalize(candidate)
}

macro_rules! kernel_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($konst:ident = $value:literal => $label:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            $(pub const $konst: Self = Self($value);)*

            const NAMES: &'static [(u32, &'static str)] = &[$(($value, $label),)*];

            /// Table name, `None` for values this build doesn't know
            #[must_use]
            pub fn name(self) -> Option<&'static str> {
                Self::NAMES.iter().find(|(value, _)| *value == self.0).map(|(_, name)| *name)
            }

            /// Look a value up by name, ignoring case and underscores
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                Self::NAMES
                    .iter()
                    .find(|(_, label)| names_match(label, name))
                    .map(|(value, _)| Self(*value))
            }

            /// Every named value, in table order
            pub fn all() -> impl Iterator<Item = Self> {
                Self::NAMES.iter().map(|(value, _)| Self(*value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}({})", stringify!($name), self.0),
                }
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

kernel_enum! {
    /// `bpf(2)` sub-command (`enum bpf_cmd`)
    BpfCmd {
            MAP_CREATE = 0 => "BpfMapCreate",
            MAP_LOOKUP_ELEM = 1 => "BpfMapLookupElem",
            MAP_UPDATE_ELEM = 2 => "BpfMapUpdateElem",
            MAP_DELETE_ELEM = 3 => "BpfMapDeleteElem",
            MAP_GET_NEXT_KEY = 4 => "BpfMapGetNextKey",
            PROG_LOAD = 5 => "BpfProgLoad",
            OBJ_PIN = 6 => "BpfObjPin",
            OBJ_GET = 7 => "BpfObjGet",
            PROG_ATTACH = 8 => "BpfProgAttach",
            PROG_DETACH = 9 => "BpfProgDetach",
            PROG_TEST_RUN = 10 => "BpfProgTestRun",
            PROG_GET_NEXT_ID = 11 => "BpfProgGetNextId",
            MAP_GET_NEXT_ID = 12 => "BpfMapGetNextId",
            PROG_GET_FD_BY_ID = 13 => "BpfProgGetFdById",
            MAP_GET_FD_BY_ID = 14 => "BpfMapGetFdById",
            OBJ_GET_INFO_BY_FD = 15 => "BpfObjGetInfoByFd",
            PROG_QUERY = 16 => "BpfProgQuery",
            RAW_TRACEPOINT_OPEN = 17 => "BpfRawTracepointOpen",
            BTF_LOAD = 18 => "BpfBtfLoad",
            BTF_GET_FD_BY_ID = 19 => "BpfBtfGetFdById",
            TASK_FD_QUERY = 20 => "BpfTaskFdQuery",
            MAP_LOOKUP_AND_DELETE_ELEM = 21 => "BpfMapLookupAndDeleteElem",
            MAP_FREEZE = 22 => "BpfMapFreeze",
            BTF_GET_NEXT_ID = 23 => "BpfBtfGetNextId",
            MAP_LOOKUP_BATCH = 24 => "BpfMapLookupBatch",
            MAP_LOOKUP_AND_DELETE_BATCH = 25 => "BpfMapLookupAndDeleteBatch",
            MAP_UPDATE_BATCH = 26 => "BpfMapUpdateBatch",
            MAP_DELETE_BATCH = 27 => "BpfMapDeleteBatch",
            LINK_CREATE = 28 => "BpfLinkCreate",
            LINK_UPDATE = 29 => "BpfLinkUpdate",
            LINK_GET_FD_BY_ID = 30 => "BpfLinkGetFdById",
            LINK_GET_NEXT_ID = 31 => "BpfLinkGetNextId",
            ENABLE_STATS = 32 => "BpfEnableStats",
            ITER_CREATE = 33 => "BpfIterCreate",
            LINK_DETACH = 34 => "BpfLinkDetach",
            PROG_BIND_MAP = 35 => "BpfProgBindMap",
    }
}

kernel_enum! {
    /// Kernel helper function id (`enum bpf_func_id`)
    HelperFunc {
            UNSPEC = 0 => "BpfUnspec",
            MAP_LOOKUP_ELEM = 1 => "BpfMapLookupElem",
            MAP_UPDATE_ELEM = 2 => "BpfMapUpdateElem",
            MAP_DELETE_ELEM = 3 => "BpfMapDeleteElem",
            PROBE_READ = 4 => "BpfProbeRead",
            KTIME_GET_NS = 5 => "BpfKtimeGetNs",
            TRACE_PRINTK = 6 => "BpfTracePrintk",
            GET_PRANDOM_U32 = 7 => "BpfGetPrandomU32",
            GET_SMP_PROCESSOR_ID = 8 => "BpfGetSmpProcessorId",
            SKB_STORE_BYTES = 9 => "BpfSkbStoreBytes",
            L3_CSUM_REPLACE = 10 => "BpfL3CsumReplace",
            L4_CSUM_REPLACE = 11 => "BpfL4CsumReplace",
            TAIL_CALL = 12 => "BpfTailCall",
            CLONE_REDIRECT = 13 => "BpfCloneRedirect",
            GET_CURRENT_PID_TGID = 14 => "BpfGetCurrentPidTgid",
            GET_CURRENT_UID_GID = 15 => "BpfGetCurrentUidGid",
            GET_CURRENT_COMM = 16 => "BpfGetCurrentComm",
            GET_CGROUP_CLASSID = 17 => "BpfGetCgroupClassid",
            SKB_VLAN_PUSH = 18 => "BpfSkbVlanPush",
            SKB_VLAN_POP = 19 => "BpfSkbVlanPop",
            SKB_GET_TUNNEL_KEY = 20 => "BpfSkbGetTunnelKey",
            SKB_SET_TUNNEL_KEY = 21 => "BpfSkbSetTunnelKey",
            PERF_EVENT_READ = 22 => "BpfPerfEventRead",
            REDIRECT = 23 => "BpfRedirect",
            GET_ROUTE_REALM = 24 => "BpfGetRouteRealm",
            PERF_EVENT_OUTPUT = 25 => "BpfPerfEventOutput",
            SKB_LOAD_BYTES = 26 => "BpfSkbLoadBytes",
            GET_STACKID = 27 => "BpfGetStackid",
            CSUM_DIFF = 28 => "BpfCsumDiff",
            SKB_GET_TUNNEL_OPT = 29 => "BpfSkbGetTunnelOpt",
            SKB_SET_TUNNEL_OPT = 30 => "BpfSkbSetTunnelOpt",
            SKB_CHANGE_PROTO = 31 => "BpfSkbChangeProto",
            SKB_CHANGE_TYPE = 32 => "BpfSkbChangeType",
            SKB_UNDER_CGROUP = 33 => "BpfSkbUnderCgroup",
            GET_HASH_RECALC = 34 => "BpfGetHashRecalc",
            GET_CURRENT_TASK = 35 => "BpfGetCurrentTask",
            PROBE_WRITE_USER = 36 => "BpfProbeWriteUser",
            CURRENT_TASK_UNDER_CGROUP = 37 => "BpfCurrentTaskUnderCgroup",
            SKB_CHANGE_TAIL = 38 => "BpfSkbChangeTail",
            SKB_PULL_DATA = 39 => "BpfSkbPullData",
            CSUM_UPDATE = 40 => "BpfCsumUpdate",
            SET_HASH_INVALID = 41 => "BpfSetHashInvalid",
            GET_NUMA_NODE_ID = 42 => "BpfGetNumaNodeId",
            SKB_CHANGE_HEAD = 43 => "BpfSkbChangeHead",
            XDP_ADJUST_HEAD = 44 => "BpfXdpAdjustHead",
            PROBE_READ_STR = 45 => "BpfProbeReadStr",
            GET_SOCKET_COOKIE = 46 => "BpfGetSocketCookie",
            GET_SOCKET_UID = 47 => "BpfGetSocketUid",
            SET_HASH = 48 => "BpfSetHash",
            SETSOCKOPT = 49 => "BpfSetsockopt",
            SKB_ADJUST_ROOM = 50 => "BpfSkbAdjustRoom",
            REDIRECT_MAP = 51 => "BpfRedirectMap",
            SK_REDIRECT_MAP = 52 => "BpfSkRedirectMap",
            SOCK_MAP_UPDATE = 53 => "BpfSockMapUpdate",
            XDP_ADJUST_META = 54 => "BpfXdpAdjustMeta",
            PERF_EVENT_READ_VALUE = 55 => "BpfPerfEventReadValue",
            PERF_PROG_READ_VALUE = 56 => "BpfPerfProgReadValue",
            GETSOCKOPT = 57 => "BpfGetsockopt",
            OVERRIDE_RETURN = 58 => "BpfOverrideReturn",
            SOCK_OPS_CB_FLAGS_SET = 59 => "BpfSockOpsCbFlagsSet",
            MSG_REDIRECT_MAP = 60 => "BpfMsgRedirectMap",
            MSG_APPLY_BYTES = 61 => "BpfMsgApplyBytes",
            MSG_CORK_BYTES = 62 => "BpfMsgCorkBytes",
            MSG_PULL_DATA = 63 => "BpfMsgPullData",
            BIND = 64 => "BpfBind",
            XDP_ADJUST_TAIL = 65 => "BpfXdpAdjustTail",
            SKB_GET_XFRM_STATE = 66 => "BpfSkbGetXfrmState",
            GET_STACK = 67 => "BpfGetStack",
            SKB_LOAD_BYTES_RELATIVE = 68 => "BpfSkbLoadBytesRelative",
            FIB_LOOKUP = 69 => "BpfFibLookup",
            SOCK_HASH_UPDATE = 70 => "BpfSockHashUpdate",
            MSG_REDIRECT_HASH = 71 => "BpfMsgRedirectHash",
            SK_REDIRECT_HASH = 72 => "BpfSkRedirectHash",
            LWT_PUSH_ENCAP = 73 => "BpfLwtPushEncap",
            LWT_SEG6_STORE_BYTES = 74 => "BpfLwtSeg6StoreBytes",
            LWT_SEG6_ADJUST_SRH = 75 => "BpfLwtSeg6AdjustSrh",
            LWT_SEG6_ACTION = 76 => "BpfLwtSeg6Action",
            RC_REPEAT = 77 => "BpfRcRepeat",
            RC_KEYDOWN = 78 => "BpfRcKeydown",
            SKB_CGROUP_ID = 79 => "BpfSkbCgroupId",
            GET_CURRENT_CGROUP_ID = 80 => "BpfGetCurrentCgroupId",
            GET_LOCAL_STORAGE = 81 => "BpfGetLocalStorage",
            SK_SELECT_REUSEPORT = 82 => "BpfSkSelectReuseport",
            SKB_ANCESTOR_CGROUP_ID = 83 => "BpfSkbAncestorCgroupId",
            SK_LOOKUP_TCP = 84 => "BpfSkLookupTcp",
            SK_LOOKUP_UDP = 85 => "BpfSkLookupUdp",
            SK_RELEASE = 86 => "BpfSkRelease",
            MAP_PUSH_ELEM = 87 => "BpfMapPushElem",
            MAP_POP_ELEM = 88 => "BpfMapPopElem",
            MAP_PEEK_ELEM = 89 => "BpfMapPeekElem",
            MSG_PUSH_DATA = 90 => "BpfMsgPushData",
            MSG_POP_DATA = 91 => "BpfMsgPopData",
            RC_POINTER_REL = 92 => "BpfRcPointerRel",
            SPIN_LOCK = 93 => "BpfSpinLock",
            SPIN_UNLOCK = 94 => "BpfSpinUnlock",
            SK_FULLSOCK = 95 => "BpfSkFullsock",
            TCP_SOCK = 96 => "BpfTcpSock",
            SKB_ECN_SET_CE = 97 => "BpfSkbEcnSetCe",
            GET_LISTENER_SOCK = 98 => "BpfGetListenerSock",
            SKC_LOOKUP_TCP = 99 => "BpfSkcLookupTcp",
            TCP_CHECK_SYNCOOKIE = 100 => "BpfTcpCheckSyncookie",
            SYSCTL_GET_NAME = 101 => "BpfSysctlGetName",
            SYSCTL_GET_CURRENT_VALUE = 102 => "BpfSysctlGetCurrentValue",
            SYSCTL_GET_NEW_VALUE = 103 => "BpfSysctlGetNewValue",
            SYSCTL_SET_NEW_VALUE = 104 => "BpfSysctlSetNewValue",
            STRTOL = 105 => "BpfStrtol",
            STRTOUL = 106 => "BpfStrtoul",
            SK_STORAGE_GET = 107 => "BpfSkStorageGet",
            SK_STORAGE_DELETE = 108 => "BpfSkStorageDelete",
            SEND_SIGNAL = 109 => "BpfSendSignal",
            TCP_GEN_SYNCOOKIE = 110 => "BpfTcpGenSyncookie",
            SKB_OUTPUT = 111 => "BpfSkbOutput",
            PROBE_READ_USER = 112 => "BpfProbeReadUser",
            PROBE_READ_KERNEL = 113 => "BpfProbeReadKernel",
            PROBE_READ_USER_STR = 114 => "BpfProbeReadUserStr",
            PROBE_READ_KERNEL_STR = 115 => "BpfProbeReadKernelStr",
            TCP_SEND_ACK = 116 => "BpfTcpSendAck",
            SEND_SIGNAL_THREAD = 117 => "BpfSendSignalThread",
            JIFFIES64 = 118 => "BpfJiffies64",
            READ_BRANCH_RECORDS = 119 => "BpfReadBranchRecords",
            GET_NS_CURRENT_PID_TGID = 120 => "BpfGetNsCurrentPidTgid",
            XDP_OUTPUT = 121 => "BpfXdpOutput",
            GET_NETNS_COOKIE = 122 => "BpfGetNetnsCookie",
            GET_CURRENT_ANCESTOR_CGROUP_ID = 123 => "BpfGetCurrentAncestorCgroupId",
            SK_ASSIGN = 124 => "BpfSkAssign",
            KTIME_GET_BOOT_NS = 125 => "BpfKtimeGetBootNs",
            SEQ_PRINTF = 126 => "BpfSeqPrintf",
            SEQ_WRITE = 127 => "BpfSeqWrite",
            SK_CGROUP_ID = 128 => "BpfSkCgroupId",
            SK_ANCESTOR_CGROUP_ID = 129 => "BpfSkAncestorCgroupId",
            RINGBUF_OUTPUT = 130 => "BpfRingbufOutput",
            RINGBUF_RESERVE = 131 => "BpfRingbufReserve",
            RINGBUF_SUBMIT = 132 => "BpfRingbufSubmit",
            RINGBUF_DISCARD = 133 => "BpfRingbufDiscard",
            RINGBUF_QUERY = 134 => "BpfRingbufQuery",
            CSUM_LEVEL = 135 => "BpfCsumLevel",
            SKC_TO_TCP6_SOCK = 136 => "BpfSkcToTcp6Sock",
            SKC_TO_TCP_SOCK = 137 => "BpfSkcToTcpSock",
            SKC_TO_TCP_TIMEWAIT_SOCK = 138 => "BpfSkcToTcpTimewaitSock",
            SKC_TO_TCP_REQUEST_SOCK = 139 => "BpfSkcToTcpRequestSock",
            SKC_TO_UDP6_SOCK = 140 => "BpfSkcToUdp6Sock",
            GET_TASK_STACK = 141 => "BpfGetTaskStack",
            LOAD_HDR_OPT = 142 => "BpfLoadHdrOpt",
            STORE_HDR_OPT = 143 => "BpfStoreHdrOpt",
            RESERVE_HDR_OPT = 144 => "BpfReserveHdrOpt",
            INODE_STORAGE_GET = 145 => "BpfInodeStorageGet",
            INODE_STORAGE_DELETE = 146 => "BpfInodeStorageDelete",
            DPATH = 147 => "BpfDPath",
            COPY_FROM_USER = 148 => "BpfCopyFromUser",
            SNPRINTF_BTF = 149 => "BpfSnprintfBtf",
            SEQ_PRINTF_BTF = 150 => "BpfSeqPrintfBtf",
            SKB_CGROUP_CLASSID = 151 => "BpfSkbCgroupClassid",
            REDIRECT_NEIGH = 152 => "BpfRedirectNeigh",
            PER_CPU_PTR = 153 => "BpfPerCpuPtr",
            THIS_CPU_PTR = 154 => "BpfThisCpuPtr",
            REDIRECT_PEER = 155 => "BpfRedirectPeer",
            TASK_STORAGE_GET = 156 => "BpfTaskStorageGet",
            TASK_STORAGE_DELETE = 157 => "BpfTaskStorageDelete",
            GET_CURRENT_TASK_BTF = 158 => "BpfGetCurrentTaskBtf",
            BPRM_OPTS_SET = 159 => "BpfBprmOptsSet",
            KTIME_GET_COARSE_NS = 160 => "BpfKtimeGetCoarseNs",
            IMA_INODE_HASH = 161 => "BpfImaInodeHash",
            SOCK_FROM_FILE = 162 => "BpfSockFromFile",
            CHECK_MTU = 163 => "BpfCheckMtu",
            FOR_EACH_MAP_ELEM = 164 => "BpfForEachMapElem",
            SNPRINTF = 165 => "BpfSnprintf",
    }
}

kernel_enum! {
    /// Map type (`enum bpf_map_type`)
    MapType {
            UNSPEC = 0 => "BpfMapTypeUnspec",
            HASH = 1 => "BpfMapTypeHash",
            ARRAY = 2 => "BpfMapTypeArray",
            PROG_ARRAY = 3 => "BpfMapTypeProgArray",
            PERF_EVENT_ARRAY = 4 => "BpfMapTypePerfEventArray",
            PERCPU_HASH = 5 => "BpfMapTypePercpuHash",
            PERCPU_ARRAY = 6 => "BpfMapTypePercpuArray",
            STACK_TRACE = 7 => "BpfMapTypeStackTrace",
            CGROUP_ARRAY = 8 => "BpfMapTypeCgroupArray",
            LRU_HASH = 9 => "BpfMapTypeLruHash",
            LRU_PERCPU_HASH = 10 => "BpfMapTypeLruPercpuHash",
            LPM_TRIE = 11 => "BpfMapTypeLpmTrie",
            ARRAY_OF_MAPS = 12 => "BpfMapTypeArrayOfMaps",
            HASH_OF_MAPS = 13 => "BpfMapTypeHashOfMaps",
            DEVMAP = 14 => "BpfMapTypeDevmap",
            SOCKMAP = 15 => "BpfMapTypeSockmap",
            CPUMAP = 16 => "BpfMapTypeCpumap",
            XSKMAP = 17 => "BpfMapTypeXskmap",
            SOCKHASH = 18 => "BpfMapTypeSockhash",
            CGROUP_STORAGE = 19 => "BpfMapTypeCgroupStorage",
            REUSEPORT_SOCKARRAY = 20 => "BpfMapTypeReuseportSockarray",
            PERCPU_CGROUP_STORAGE = 21 => "BpfMapTypePercpuCgroupStorage",
            QUEUE = 22 => "BpfMapTypeQueue",
            STACK = 23 => "BpfMapTypeStack",
            SK_STORAGE = 24 => "BpfMapTypeSkStorage",
            DEVMAP_HASH = 25 => "BpfMapTypeDevmapHash",
            STRUCT_OPS = 26 => "BpfMapTypeStructOps",
            RINGBUF = 27 => "BpfMapTypeRingbuf",
            INODE_STORAGE = 28 => "BpfMapTypeInodeStorage",
            TASK_STORAGE = 29 => "BpfMapTypeTaskStorage",
    }
}

kernel_enum! {
    /// Program type (`enum bpf_prog_type`)
    ProgramType {
            UNSPEC = 0 => "BpfProgTypeUnspec",
            SOCKET_FILTER = 1 => "BpfProgTypeSocketFilter",
            KPROBE = 2 => "BpfProgTypeKprobe",
            SCHED_CLS = 3 => "BpfProgTypeSchedCls",
            SCHED_ACT = 4 => "BpfProgTypeSchedAct",
            TRACEPOINT = 5 => "BpfProgTypeTracepoint",
            XDP = 6 => "BpfProgTypeXdp",
            PERF_EVENT = 7 => "BpfProgTypePerfEvent",
            CGROUP_SKB = 8 => "BpfProgTypeCgroupSkb",
            CGROUP_SOCK = 9 => "BpfProgTypeCgroupSock",
            LWT_IN = 10 => "BpfProgTypeLwtIn",
            LWT_OUT = 11 => "BpfProgTypeLwtOut",
            LWT_XMIT = 12 => "BpfProgTypeLwtXmit",
            SOCK_OPS = 13 => "BpfProgTypeSockOps",
            SK_SKB = 14 => "BpfProgTypeSkSkb",
            CGROUP_DEVICE = 15 => "BpfProgTypeCgroupDevice",
            SK_MSG = 16 => "BpfProgTypeSkMsg",
            RAW_TRACEPOINT = 17 => "BpfProgTypeRawTracepoint",
            CGROUP_SOCK_ADDR = 18 => "BpfProgTypeCgroupSockAddr",
            LWT_SEG6LOCAL = 19 => "BpfProgTypeLwtSeg6local",
            LIRC_MODE2 = 20 => "BpfProgTypeLircMode2",
            SK_REUSEPORT = 21 => "BpfProgTypeSkReuseport",
            FLOW_DISSECTOR = 22 => "BpfProgTypeFlowDissector",
            CGROUP_SYSCTL = 23 => "BpfProgTypeCgroupSysctl",
            RAW_TRACEPOINT_WRITABLE = 24 => "BpfProgTypeRawTracepointWritable",
            CGROUP_SOCKOPT = 25 => "BpfProgTypeCgroupSockopt",
            TRACING = 26 => "BpfProgTypeTracing",
            STRUCT_OPS = 27 => "BpfProgTypeStructOps",
            EXT = 28 => "BpfProgTypeExt",
            LSM = 29 => "BpfProgTypeLsm",
            SK_LOOKUP = 30 => "BpfProgTypeSkLookup",
    }
}

kernel_enum! {
    /// Attach type, numbered from 1 so that 0 means "none"
    AttachType {
            CGROUP_INET_INGRESS = 1 => "BpfCgroupInetIngress",
            CGROUP_INET_EGRESS = 2 => "BpfCgroupInetEgress",
            CGROUP_INET_SOCK_CREATE = 3 => "BpfCgroupInetSockCreate",
            CGROUP_SOCK_OPS = 4 => "BpfCgroupSockOps",
            SK_SKB_STREAM_PARSER = 5 => "BpfSkSkbStreamParser",
            SK_SKB_STREAM_VERDICT = 6 => "BpfSkSkbStreamVerdict",
            CGROUP_DEVICE = 7 => "BpfCgroupDevice",
            SK_MSG_VERDICT = 8 => "BpfSkMsgVerdict",
            CGROUP_INET4_BIND = 9 => "BpfCgroupInet4Bind",
            CGROUP_INET6_BIND = 10 => "BpfCgroupInet6Bind",
            CGROUP_INET4_CONNECT = 11 => "BpfCgroupInet4Connect",
            CGROUP_INET6_CONNECT = 12 => "BpfCgroupInet6Connect",
            CGROUP_INET4_POST_BIND = 13 => "BpfCgroupInet4PostBind",
            CGROUP_INET6_POST_BIND = 14 => "BpfCgroupInet6PostBind",
            CGROUP_UDP4_SENDMSG = 15 => "BpfCgroupUdp4Sendmsg",
            CGROUP_UDP6_SENDMSG = 16 => "BpfCgroupUdp6Sendmsg",
            LIRC_MODE2 = 17 => "BpfLircMode2",
            FLOW_DISSECTOR = 18 => "BpfFlowDissector",
            CGROUP_SYSCTL = 19 => "BpfCgroupSysctl",
            CGROUP_UDP4_RECVMSG = 20 => "BpfCgroupUdp4Recvmsg",
            CGROUP_UDP6_RECVMSG = 21 => "BpfCgroupUdp6Recvmsg",
            CGROUP_GETSOCKOPT = 22 => "BpfCgroupGetsockopt",
            CGROUP_SETSOCKOPT = 23 => "BpfCgroupSetsockopt",
            TRACE_RAW_TP = 24 => "BpfTraceRawTp",
            TRACE_FENTRY = 25 => "BpfTraceFentry",
            TRACE_FEXIT = 26 => "BpfTraceFexit",
            MODIFY_RETURN = 27 => "BpfModifyReturn",
            LSM_MAC = 28 => "BpfLsmMac",
            TRACE_ITER = 29 => "BpfTraceIter",
            CGROUP_INET4_GETPEERNAME = 30 => "BpfCgroupInet4Getpeername",
            CGROUP_INET6_GETPEERNAME = 31 => "BpfCgroupInet6Getpeername",
            CGROUP_INET4_GETSOCKNAME = 32 => "BpfCgroupInet4Getsockname",
            CGROUP_INET6_GETSOCKNAME = 33 => "BpfCgroupInet6Getsockname",
            XDP_DEVMAP = 34 => "BpfXdpDevmap",
            CGROUP_INET_SOCK_RELEASE = 35 => "BpfCgroupInetSockRelease",
            XDP_CPUMAP = 36 => "BpfXdpCpumap",
            SK_LOOKUP = 37 => "BpfSkLookup",
            XDP = 38 => "BpfXdp",
            SK_SKB_VERDICT = 39 => "BpfSkSkbVerdict",
    }
}

impl AttachType {
    /// Attach type of a loaded program
    ///
    /// A nonzero raw value is used verbatim. When the loader left it unset, the
    /// cgroup program types default to [`AttachType::CGROUP_INET_INGRESS`] and
    /// every other type gets 0 ("none").
    #[must_use]
    pub fn resolve(program_type: ProgramType, raw: u32) -> Self {
        if raw > 0 {
            return Self(raw);
        }
        match program_type {
            ProgramType::CGROUP_DEVICE
            | ProgramType::CGROUP_SOCK
            | ProgramType::CGROUP_SOCKOPT
            | ProgramType::CGROUP_SKB
            | ProgramType::CGROUP_SYSCTL
            | ProgramType::CGROUP_SOCK_ADDR => Self::CGROUP_INET_INGRESS,
            _ => Self(0),
        }
    }

    /// Whether this is the "none" value
    #[must_use]
    #[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes a reference
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}
