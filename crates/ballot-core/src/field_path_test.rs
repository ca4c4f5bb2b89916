use super::{FieldPath, FieldPathSegment};

#[test]
fn root_renders_as_dollar() {
    assert_eq!(FieldPath::root().to_string(), "$");
    assert!(FieldPath::root().is_root());
}

#[test]
fn builder_renders_keys_and_indexes() {
    let path = FieldPath::from_keys(["contract", "proposals"]).index(2);
    assert_eq!(path.to_string(), "$.contract.proposals[2]");
    assert_eq!(path.segments().last(), Some(&FieldPathSegment::Index(2)));
}

#[test]
fn chain_keys_keep_their_colon() {
    let path = FieldPath::root().key("chains").key("eip155:42").key("rpc_url");
    assert_eq!(path.to_string(), "$.chains.eip155:42.rpc_url");
}
