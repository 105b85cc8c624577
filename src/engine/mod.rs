pub mod feed;
pub mod invoker;
pub mod launcher;
pub mod resolver;
pub mod waiter;

pub use feed::FeedAssembler;
pub use invoker::CrossAgentInvoker;
pub use launcher::ExecutionLauncher;
pub use resolver::{ConfigurationResolver, ResolvedConfiguration};
pub use waiter::{ExecutionWaiter, WaitOutcome, WaitPolicy};
