//! Section name conventions
//!
//! Program type and expected attach type are declared by the section a
//! program is placed in (`SEC("kprobe/...")`, `SEC("cgroup/connect4")`, ...).

use crate::model::{AttachType, ProgramType};

/// Prefix table, most specific entries first.
///
/// An entry ending in `/` matches any section starting with it; any other
/// entry matches the section name exactly or followed by `/`.
const PREFIXES: &[(&str, ProgramType, AttachType)] = &[
    ("socket", ProgramType::SOCKET_FILTER, AttachType(0)),
    ("sk_reuseport", ProgramType::SK_REUSEPORT, AttachType(0)),
    ("kprobe/", ProgramType::KPROBE, AttachType(0)),
    ("kretprobe/", ProgramType::KPROBE, AttachType(0)),
    ("uprobe/", ProgramType::KPROBE, AttachType(0)),
    ("uretprobe/", ProgramType::KPROBE, AttachType(0)),
    ("tracepoint/", ProgramType::TRACEPOINT, AttachType(0)),
    ("tp/", ProgramType::TRACEPOINT, AttachType(0)),
    ("raw_tracepoint.w/", ProgramType::RAW_TRACEPOINT_WRITABLE, AttachType(0)),
    ("raw_tracepoint/", ProgramType::RAW_TRACEPOINT, AttachType(0)),
    ("raw_tp/", ProgramType::RAW_TRACEPOINT, AttachType(0)),
    ("tp_btf/", ProgramType::TRACING, AttachType::TRACE_RAW_TP),
    ("xdp_devmap/", ProgramType::XDP, AttachType::XDP_DEVMAP),
    ("xdp_cpumap/", ProgramType::XDP, AttachType::XDP_CPUMAP),
    ("xdp", ProgramType::XDP, AttachType(0)),
    ("perf_event", ProgramType::PERF_EVENT, AttachType(0)),
    ("lwt_in", ProgramType::LWT_IN, AttachType(0)),
    ("lwt_out", ProgramType::LWT_OUT, AttachType(0)),
    ("lwt_xmit", ProgramType::LWT_XMIT, AttachType(0)),
    ("lwt_seg6local", ProgramType::LWT_SEG6LOCAL, AttachType(0)),
    ("lirc_mode2", ProgramType::LIRC_MODE2, AttachType::LIRC_MODE2),
    ("flow_dissector", ProgramType::FLOW_DISSECTOR, AttachType::FLOW_DISSECTOR),
    ("iter/", ProgramType::TRACING, AttachType::TRACE_ITER),
    ("fentry/", ProgramType::TRACING, AttachType::TRACE_FENTRY),
    ("fmod_ret/", ProgramType::TRACING, AttachType::MODIFY_RETURN),
    ("fexit/", ProgramType::TRACING, AttachType::TRACE_FEXIT),
    ("freplace/", ProgramType::EXT, AttachType(0)),
    ("lsm/", ProgramType::LSM, AttachType::LSM_MAC),
    ("sk_lookup", ProgramType::SK_LOOKUP, AttachType::SK_LOOKUP),
    ("struct_ops", ProgramType::STRUCT_OPS, AttachType(0)),
    ("cgroup_skb/ingress", ProgramType::CGROUP_SKB, AttachType::CGROUP_INET_INGRESS),
    ("cgroup_skb/egress", ProgramType::CGROUP_SKB, AttachType::CGROUP_INET_EGRESS),
    ("cgroup/skb", ProgramType::CGROUP_SKB, AttachType(0)),
    ("cgroup/dev", ProgramType::CGROUP_DEVICE, AttachType::CGROUP_DEVICE),
    ("cgroup/sock_release", ProgramType::CGROUP_SOCK, AttachType::CGROUP_INET_SOCK_RELEASE),
    ("cgroup/sock", ProgramType::CGROUP_SOCK, AttachType::CGROUP_INET_SOCK_CREATE),
    ("cgroup/post_bind4", ProgramType::CGROUP_SOCK, AttachType::CGROUP_INET4_POST_BIND),
    ("cgroup/post_bind6", ProgramType::CGROUP_SOCK, AttachType::CGROUP_INET6_POST_BIND),
    ("cgroup/bind4", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET4_BIND),
    ("cgroup/bind6", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET6_BIND),
    ("cgroup/connect4", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET4_CONNECT),
    ("cgroup/connect6", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET6_CONNECT),
    ("cgroup/sendmsg4", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_UDP4_SENDMSG),
    ("cgroup/sendmsg6", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_UDP6_SENDMSG),
    ("cgroup/recvmsg4", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_UDP4_RECVMSG),
    ("cgroup/recvmsg6", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_UDP6_RECVMSG),
    ("cgroup/getpeername4", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET4_GETPEERNAME),
    ("cgroup/getpeername6", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET6_GETPEERNAME),
    ("cgroup/getsockname4", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET4_GETSOCKNAME),
    ("cgroup/getsockname6", ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET6_GETSOCKNAME),
    ("cgroup/sysctl", ProgramType::CGROUP_SYSCTL, AttachType::CGROUP_SYSCTL),
    ("cgroup/getsockopt", ProgramType::CGROUP_SOCKOPT, AttachType::CGROUP_GETSOCKOPT),
    ("cgroup/setsockopt", ProgramType::CGROUP_SOCKOPT, AttachType::CGROUP_SETSOCKOPT),
    ("classifier", ProgramType::SCHED_CLS, AttachType(0)),
    ("tc", ProgramType::SCHED_CLS, AttachType(0)),
    ("action", ProgramType::SCHED_ACT, AttachType(0)),
    ("sockops", ProgramType::SOCK_OPS, AttachType::CGROUP_SOCK_OPS),
    ("sk_skb/stream_parser", ProgramType::SK_SKB, AttachType::SK_SKB_STREAM_PARSER),
    ("sk_skb/stream_verdict", ProgramType::SK_SKB, AttachType::SK_SKB_STREAM_VERDICT),
    ("sk_skb", ProgramType::SK_SKB, AttachType(0)),
    ("sk_msg", ProgramType::SK_MSG, AttachType::SK_MSG_VERDICT),
];

/// Program type and attach type declared by a section name
///
/// Unrecognized sections give `(UNSPEC, 0)`.
#[must_use]
pub fn program_types(section: &str) -> (ProgramType, AttachType) {
    PREFIXES
        .iter()
        .find(|(prefix, _, _)| matches_prefix(section, prefix))
        .map_or((ProgramType::UNSPEC, AttachType(0)), |(_, prog, attach)| (*prog, *attach))
}

fn matches_prefix(section: &str, prefix: &str) -> bool {
    if prefix.ends_with('/') {
        return section.starts_with(prefix);
    }
    section
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Whether a section holds legacy `bpf_map_def` records
#[must_use]
pub fn is_legacy_map_section(section: &str) -> bool {
    section == "maps" || section.starts_with("maps/")
}

/// Section holding BTF-style map declarations
pub const BTF_MAPS_SECTION: &str = ".maps";

/// Section holding the license string
pub const LICENSE_SECTION: &str = "license";

/// Section holding the kernel version word
pub const VERSION_SECTION: &str = "version";

/// Shared code section, not a program on its own
pub const TEXT_SECTION: &str = ".text";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_prefixes() {
        assert_eq!(program_types("kprobe/security_bpf"), (ProgramType::KPROBE, AttachType(0)));
        assert_eq!(program_types("kretprobe/do_exit"), (ProgramType::KPROBE, AttachType(0)));
        assert_eq!(
            program_types("fentry/tcp_connect"),
            (ProgramType::TRACING, AttachType::TRACE_FENTRY)
        );
        assert_eq!(program_types("lsm/bpf"), (ProgramType::LSM, AttachType::LSM_MAC));
    }

    #[test]
    fn test_cgroup_prefixes() {
        assert_eq!(
            program_types("cgroup/connect4"),
            (ProgramType::CGROUP_SOCK_ADDR, AttachType::CGROUP_INET4_CONNECT)
        );
        assert_eq!(
            program_types("cgroup_skb/egress"),
            (ProgramType::CGROUP_SKB, AttachType::CGROUP_INET_EGRESS)
        );
        // "cgroup/sock" must not swallow "cgroup/sock_release"
        assert_eq!(
            program_types("cgroup/sock_release"),
            (ProgramType::CGROUP_SOCK, AttachType::CGROUP_INET_SOCK_RELEASE)
        );
    }

    #[test]
    fn test_specific_entries_win() {
        assert_eq!(
            program_types("sk_skb/stream_parser"),
            (ProgramType::SK_SKB, AttachType::SK_SKB_STREAM_PARSER)
        );
        assert_eq!(program_types("sk_skb/other"), (ProgramType::SK_SKB, AttachType(0)));
        assert_eq!(
            program_types("raw_tracepoint.w/sys_enter"),
            (ProgramType::RAW_TRACEPOINT_WRITABLE, AttachType(0))
        );
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(program_types("mystery"), (ProgramType::UNSPEC, AttachType(0)));
    }

    #[test]
    fn test_bare_entries_need_a_separator() {
        assert_eq!(program_types("tc"), (ProgramType::SCHED_CLS, AttachType(0)));
        assert_eq!(program_types("tc/ingress"), (ProgramType::SCHED_CLS, AttachType(0)));
        assert_eq!(program_types("tcp_probe"), (ProgramType::UNSPEC, AttachType(0)));
        assert_eq!(program_types("xdp"), (ProgramType::XDP, AttachType(0)));
        assert_eq!(program_types("xdpfoo"), (ProgramType::UNSPEC, AttachType(0)));
        assert_eq!(program_types("sk_lookup"), (ProgramType::SK_LOOKUP, AttachType::SK_LOOKUP));
    }

    #[test]
    fn test_legacy_map_sections() {
        assert!(is_legacy_map_section("maps"));
        assert!(is_legacy_map_section("maps/events"));
        assert!(!is_legacy_map_section(".maps"));
        assert!(!is_legacy_map_section("mapsx"));
    }
}
