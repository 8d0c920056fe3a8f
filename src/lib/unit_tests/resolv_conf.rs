// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use crate::{ErrorKind, ResolvConf};

#[test]
fn test_resolv_conf_keep_comments_and_blank_lines() {
    let content = "# Generated by dhcp\n\
        \n\
        nameserver 192.0.2.1 ; primary\n\
        ; old entries\n\
        search example.org example.net # corp\n\
        options ndots:2\n";
    let conf = ResolvConf::from_str(content).unwrap();

    assert_eq!(conf.to_string(), content);
    assert_eq!(conf.nameservers(), vec!["192.0.2.1".to_string()]);
    assert_eq!(
        conf.search_domains(),
        vec!["example.org".to_string(), "example.net".to_string()]
    );
}

#[test]
fn test_resolv_conf_unknown_option() {
    let result = ResolvConf::from_str("nameserver 192.0.2.1\nnameservr 1.1.1.1\n");

    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::MalformedLine);
        assert_eq!(e.line_number(), 2);
        assert_eq!(e.line(), "nameservr 1.1.1.1");
    }
}

#[test]
fn test_resolv_conf_option_without_value() {
    let result = ResolvConf::from_str("search\n");

    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::MalformedLine);
        assert_eq!(e.line_number(), 1);
    }
}

#[test]
fn test_resolv_conf_add_existing_nameserver() {
    let mut conf =
        ResolvConf::from_str("nameserver 192.0.2.1\n# end\n").unwrap();

    let servers = conf.add_nameserver("192.0.2.1").unwrap();

    assert_eq!(servers, vec!["192.0.2.1".to_string()]);
    assert_eq!(conf.to_string(), "nameserver 192.0.2.1\n# end\n");
}

#[test]
fn test_resolv_conf_add_nameserver_move_to_end() {
    let mut conf =
        ResolvConf::from_str("nameserver 192.0.2.1\n# end\n").unwrap();

    conf.add_nameserver("192.0.2.2").unwrap();

    assert_eq!(
        conf.to_string(),
        "# end\nnameserver 192.0.2.1\nnameserver 192.0.2.2\n"
    );
}

#[test]
fn test_resolv_conf_too_many_nameservers() {
    let mut conf = ResolvConf::new();
    for ns in ["192.0.2.1", "192.0.2.2", "192.0.2.3"] {
        conf.add_nameserver(ns).unwrap();
    }
    let before = conf.to_string();

    let result = conf.add_nameserver("192.0.2.4");

    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::CapacityExceeded);
    }
    assert_eq!(conf.to_string(), before);
    assert_eq!(conf.nameservers().len(), 3);
}

#[test]
fn test_resolv_conf_add_search_domains_combined() {
    let mut conf = ResolvConf::from_str(
        "search a.example\nnameserver 192.0.2.1\nsearch b.example\n",
    )
    .unwrap();

    let domains = conf.add_search_domain("c.example").unwrap();

    assert_eq!(domains, vec!["a.example", "b.example", "c.example"]);
    assert_eq!(
        conf.to_string(),
        "nameserver 192.0.2.1\nsearch a.example b.example c.example\n"
    );
}

#[test]
fn test_resolv_conf_too_many_search_domains() {
    let mut conf = ResolvConf::new();
    for i in 0..6 {
        conf.add_search_domain(&format!("d{i}.example")).unwrap();
    }

    let result = conf.add_search_domain("d6.example");

    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::CapacityExceeded);
    }
    assert_eq!(conf.search_domains().len(), 6);
}

#[test]
fn test_resolv_conf_search_line_too_long() {
    let mut conf = ResolvConf::new();
    let long_domain = format!("{}.example", "a".repeat(200));
    conf.add_search_domain(&long_domain).unwrap();

    let result = conf.add_search_domain(&format!("{}.example", "b".repeat(60)));

    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::CapacityExceeded);
    }
    assert_eq!(conf.search_domains(), vec![long_domain]);
}

#[test]
fn test_resolv_conf_set_local_domain() {
    let mut conf = ResolvConf::from_str(
        "domain old.example\nnameserver 192.0.2.1\ndomain older.example\n",
    )
    .unwrap();
    assert_eq!(conf.local_domain().as_deref(), Some("old.example"));

    conf.set_local_domain("new.example");

    assert_eq!(conf.local_domain().as_deref(), Some("new.example"));
    assert_eq!(
        conf.to_string(),
        "nameserver 192.0.2.1\ndomain new.example\n"
    );
}
