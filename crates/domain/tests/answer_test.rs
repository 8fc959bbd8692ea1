use dohtunnel_domain::{split, AnswerData, AnswerSet, DnsStatus, DomainError, RecordType};
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::time::Duration;

#[test]
fn test_text_answers_are_quoted() {
    let chunks = split("deadbeef", NonZeroUsize::new(4).unwrap());
    let set = AnswerSet::from_chunks("q.data.relay.test".into(), 60, chunks);

    assert_eq!(set.status(), DnsStatus::NoError);
    let rendered: Vec<String> = set.answers().iter().map(|a| a.data.render()).collect();
    assert_eq!(rendered, vec!["\"dead\"", "\"beef\""]);
    assert!(set.answers().iter().all(|a| a.record_type == RecordType::TXT));
    assert!(set.answers().iter().all(|a| a.ttl == 60));
}

#[test]
fn test_chunks_iterate_in_answer_order() {
    let chunks = split("aabbcc", NonZeroUsize::new(2).unwrap());
    let set = AnswerSet::from_chunks("n".into(), 60, chunks);
    let ordinals: Vec<usize> = set.chunks().map(|c| c.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1, 2]);
}

#[test]
fn test_address_answers() {
    let addr: IpAddr = "1.1.1.1".parse().unwrap();
    let set = AnswerSet::from_addresses("anything.example".into(), 300, &[addr]);

    assert_eq!(set.len(), 1);
    let answer = &set.answers()[0];
    assert_eq!(answer.record_type, RecordType::A);
    assert_eq!(answer.data, AnswerData::Address(addr));
    assert_eq!(answer.data.render(), "1.1.1.1");
    assert_eq!(&*answer.name, "anything.example");
}

#[test]
fn test_empty_answer_set_carries_status() {
    let set = AnswerSet::empty(DnsStatus::NxDomain);
    assert!(set.is_empty());
    assert_eq!(set.status().code(), 3);
}

#[test]
fn test_dns_status_codes() {
    assert_eq!(DnsStatus::NoError.code(), 0);
    assert_eq!(DnsStatus::ServFail.code(), 2);
    assert_eq!(DnsStatus::NxDomain.code(), 3);
    assert_eq!(DnsStatus::from_code(2), Some(DnsStatus::ServFail));
    assert_eq!(DnsStatus::from_code(1), None);
    assert_eq!(DnsStatus::NxDomain.to_string(), "NXDOMAIN");
}

#[test]
fn test_error_taxonomy_status_mapping() {
    assert_eq!(
        DomainError::MalformedLabel("x".into()).dns_status(),
        DnsStatus::NxDomain
    );
    assert_eq!(
        DomainError::InvalidPayload("x".into()).dns_status(),
        DnsStatus::NxDomain
    );
    assert_eq!(DomainError::Timeout(Duration::from_secs(10)).dns_status(), DnsStatus::NoError);
    assert_eq!(
        DomainError::BodyTooLarge { limit: 1 }.dns_status(),
        DnsStatus::NoError
    );
    assert_eq!(
        DomainError::InternalFault("x".into()).dns_status(),
        DnsStatus::ServFail
    );

    assert!(DomainError::RelayError { cause: "refused".into() }.is_tunneled());
    assert!(!DomainError::InternalFault("x".into()).is_tunneled());
}
