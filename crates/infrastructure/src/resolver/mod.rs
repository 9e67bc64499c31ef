mod forwarding_resolver;

pub use forwarding_resolver::ForwardingResolver;
