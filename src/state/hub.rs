use tokio::sync::broadcast;

/// Notification sent after every successful contest mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestChanged {
    /// Header version after the mutation.
    pub header_version: u64,
    /// Round versions after the mutation.
    pub versions: Vec<u64>,
}

/// Simple broadcast hub wrapper used to wake push connections.
pub struct ChangeHub {
    sender: broadcast::Sender<ContestChanged>,
}

impl ChangeHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ContestChanged> {
        self.sender.subscribe()
    }

    /// Send a notification to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, change: ContestChanged) {
        let _ = self.sender.send(change);
    }
}
