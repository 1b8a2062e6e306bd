use proxygen_demo::proxies::{
    ProxyForGreeter, ProxyForTally, ProxyForVector, ProxyForVector1, ProxyInterface, ProxyProvider,
};
use proxygen_demo::shapes::{Greeter, Named, Tally, Vector, Vector1, recorded_calls};
use proxygen_runtime::ProxyError;

#[test]
fn test_free_function_proxy() {
    let mut vector = ProxyForVector;
    assert_eq!(vector.get_x(), 3.0);
    assert_eq!(vector.get_y(), 4.0);
    assert_eq!(vector.length(), 5.0);

    vector.set_y(7.0);
    assert!(recorded_calls().contains(&"setY(7)".to_string()));
}

#[test]
fn test_handler_proxy_covers_supertraits() {
    let vector = ProxyForVector1;
    assert_eq!(vector.get_x(), 1.5);
    assert_eq!(vector.scale(4.0), 6.0);
    assert!(vector.get_name().unwrap().starts_with("vector1 #"));

    let calls = recorded_calls();
    for name in ["getX", "scale", "getName"] {
        assert!(calls.iter().any(|c| c == name), "{name} missing from {calls:?}");
    }
}

#[test]
fn test_unit_handler_forwards_arguments() {
    let mut greeter = ProxyForGreeter;
    assert_eq!(greeter.greet("Ada".to_string()), "greet, Ada!");
    greeter.reset();
}

#[test]
fn test_constructed_handler_is_shared() {
    let first = ProxyForTally;
    let second: Box<dyn Tally> = ProxyProvider::create_proxy::<dyn Tally>().unwrap();
    let before = first.bump(0);
    assert_eq!(second.bump(2), before + 2);
    assert_eq!(first.bump(3), before + 5);
}

#[test]
fn test_registry_lists_interfaces_in_order() {
    let names: Vec<&str> = ProxyInterface::ALL
        .iter()
        .map(|interface| interface.qualified_name())
        .collect();
    assert_eq!(
        names,
        vec![
            "crate::shapes::Vector",
            "crate::shapes::Vector1",
            "crate::shapes::Greeter",
            "crate::shapes::Tally",
        ]
    );
    assert_eq!(
        ProxyInterface::from_qualified_name("crate::shapes::Greeter"),
        Some(ProxyInterface::Greeter)
    );
    assert_eq!(ProxyInterface::Vector1.to_string(), "crate::shapes::Vector1");
}

#[test]
fn test_provider_lookups() {
    let vector = ProxyProvider::create_proxy_for::<dyn Vector>(ProxyInterface::Vector).unwrap();
    assert_eq!(vector.length(), 5.0);

    let any = ProxyProvider::create_proxy_by_name("crate::shapes::Greeter").unwrap();
    let greeter = any.downcast::<Box<dyn Greeter>>().unwrap();
    assert_eq!(greeter.greet("Bob".to_string()), "greet, Bob!");

    assert_eq!(
        ProxyProvider::create_proxy_by_name("crate::shapes::Missing").err(),
        Some(ProxyError::NoProxyFound {
            interface: "crate::shapes::Missing".to_string()
        })
    );
    assert!(matches!(
        ProxyProvider::create_proxy_for::<dyn Greeter>(ProxyInterface::Vector),
        Err(ProxyError::ProxyTypeMismatch { .. })
    ));
}
