mod augmentation;
pub use augmentation::{AdvancedAugmentation, Augmentation, AugmentationContext};

mod batched_writer;
pub use batched_writer::BatchedWriter;

mod connect;
pub use connect::{ConnectFn, connect_fn};

mod pool;
pub use pool::AugmentationWorkerPool;

mod remote_client;
pub use remote_client::{
  AugmentationConversationResponse, AugmentationEntityResponse, AugmentationLlmMeta, AugmentationLlmModelMeta, AugmentationMessage,
  AugmentationProcessResponse, AugmentationRequest, AugmentationRequestConversation, AugmentationRequestMeta, AugmentationResponse,
  AugmentationSdkMeta, AugmentationStorageMeta, RemoteAugmentationClient, Triple, TripleNode,
};

mod write_task;
pub use write_task::WriteTask;
