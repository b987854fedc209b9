use parking_lot::Mutex;

/// In-order device execution stream.
///
/// Every primitive issued on a stream executes in program order; a later
/// primitive observes the effects of all earlier ones. The reference
/// executor runs eagerly, so ordering holds trivially; the stream also keeps
/// a log of issued op names so tests can assert on what was (or was not)
/// dispatched.
#[derive(Debug, Default)]
pub struct Stream {
    log: Mutex<Vec<String>>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record issuance of a primitive on this stream.
    pub(crate) fn record(&self, op_name: &str) {
        self.log.lock().push(op_name.to_string());
    }

    /// Names of all primitives issued so far, in program order.
    pub fn issued_ops(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// Number of primitives issued so far.
    pub fn issued_count(&self) -> usize {
        self.log.lock().len()
    }

    /// Drop the issuance log (does not affect executed work).
    pub fn clear_log(&self) {
        self.log.lock().clear();
    }
}
