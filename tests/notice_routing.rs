//! 端到端路由场景：规则文件 → 路由器 → 内存宿主

use std::io::Write;

use rsnotice::dispatcher::synthesize_raw_notice;
use rsnotice::{
    ConfigManager, DestinationResolver, GlobalConfig, HostLevel, MemoryHost, NoticeEvent,
    NoticeHost, NoticeRouter, RsnoticeError, RuleLoader,
};

const SERVER: &str = "irc.example.net";

const RULES: &str = "\
# 服务器通知规则
kill
^Received KILL message for (\\S+)
[$0] $0 killed $1
kill MSG

# 链路通知：带服务器名
link SERVERNAME CONTINUEMATCH
Link with (\\S+) established
$1 linked $2
links NONE

linkall
Link with
$0 link
EFNet: everything

spam
Spam from
$0
devnull
";

fn event<'a>(tag: &'a str, identity: &'a str, raw: &'a str) -> NoticeEvent<'a> {
    NoticeEvent {
        network_tag: tag,
        server_address: SERVER,
        source_identity: identity,
        hostmask: "",
        raw_text: raw,
    }
}

#[tokio::test]
async fn routes_notices_from_rule_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RULES.as_bytes()).unwrap();

    let config = ConfigManager::custom()
        .rule_file_path(file.path())
        .servername_rewrite(r"^([^.]+)\.")
        .build();
    let router = NoticeRouter::new(config);
    let mut host = MemoryHost::new("status").with_sinks(["kill", "links", "everything"]);
    let summary = router.reload(&mut host).await.unwrap();
    assert_eq!(summary.processed, 4);
    assert!(summary.errors.is_empty());

    // KILL 场景
    let raw = synthesize_raw_notice("me", "Received KILL message for baduser");
    assert!(router.dispatch(&event("EFNet", SERVER, &raw), &mut host).is_consumed());
    let delivered = host.take_deliveries();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].sink, "kill");
    assert_eq!(delivered[0].level, HostLevel::Public);
    assert_eq!(delivered[0].args, vec!["EFNet", "baduser"]);
    assert_eq!(delivered[0].text, "EFNet killed baduser");

    // SERVERNAME + CONTINUEMATCH：两条规则依次命中
    let raw = synthesize_raw_notice("me", "Link with hub.example.net established");
    assert!(router.dispatch(&event("EFNet", SERVER, &raw), &mut host).is_consumed());
    let delivered = host.take_deliveries();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].sink, "links");
    assert_eq!(delivered[0].args, vec!["EFNet", "irc", "hub.example.net"]);
    assert_eq!(delivered[0].text, "irc linked hub.example.net");
    assert_eq!(delivered[0].level, HostLevel::PublicNoActivity);
    assert_eq!(delivered[1].sink, "everything");

    // 网络限定：其他网络只命中第一条
    let raw = synthesize_raw_notice("me", "Link with hub.example.net established");
    router.dispatch(&event("IRCnet", SERVER, &raw), &mut host);
    assert_eq!(host.take_deliveries().len(), 1);

    // devnull：消费但不投递
    let raw = synthesize_raw_notice("me", "Spam from somewhere");
    assert!(router.dispatch(&event("EFNet", SERVER, &raw), &mut host).is_consumed());
    assert!(host.take_deliveries().is_empty());

    // 未命中任何规则
    let raw = synthesize_raw_notice("me", "Something unrelated");
    assert!(!router.dispatch(&event("EFNet", SERVER, &raw), &mut host).is_consumed());

    // 非服务器通知形态
    let raw = "NOTICE #ops :*** Notice -- Received KILL message for baduser";
    assert!(!router.dispatch(&event("EFNet", SERVER, raw), &mut host).is_consumed());
    assert!(host.deliveries().is_empty());
}

#[test]
fn malformed_record_is_reported_and_skipped() {
    let text = "\
alpha
a
$0
x
123BAD name
b
$0
y
beta
c
$0
z
";
    let report = RuleLoader::parse_str(text, &GlobalConfig::default());
    assert_eq!(report.processed(), 2);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        report.errors[0],
        RsnoticeError::RuleParseError { line: 5, .. }
    ));
    let names: Vec<&str> = report.table.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}

#[test]
fn resolver_fallback_policy() {
    let mut host = MemoryHost::new("status").with_sinks(["foo", "net1_foo"]);
    host.set_active("query");
    assert_eq!(DestinationResolver::resolve(&host, "active", "Net1", true), "query");
    assert_eq!(DestinationResolver::resolve(&host, "foo", "Net1", true), "net1_foo");
    assert_eq!(DestinationResolver::resolve(&host, "nowhere", "Net1", true), host.default_sink());
}
