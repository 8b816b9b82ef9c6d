pub mod host;

pub use host::FakeAixHost;
