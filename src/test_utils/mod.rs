mod mock_client;

pub use mock_client::MockBridgeClient;
