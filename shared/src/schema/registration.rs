/// Explicit, inspectable registration record tying a concrete entity
/// implementation to its schema kind.
///
/// Every replicable kind registers one of these before any instance is
/// created; the server validates the table against the schema at
/// startup. This is a plain table on purpose — there is no
/// registration magic, just data checked once.
pub struct KindRegistration {
    pub name: &'static str,
    /// Field names the concrete implementation replicates. Declaration
    /// order is irrelevant; the schema's sorted order rules the wire.
    pub replicated_fields: &'static [&'static str],
}
