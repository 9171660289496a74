//! 好友申请模块
//!
//! 申请记录的读写、状态流转以及搜索结果的关系标注

pub mod dao;
pub mod models;
pub mod query;
pub mod service;
pub mod types;

// 重新导出主要类型
pub use dao::FriendRequestDao;
pub use models::{
    FriendRequest, RejectOutcome, RequestStatus, RequestWithPeer, SendOutcome,
    SentRequest,
};
pub use query::RelationshipQuery;
pub use service::RequestWorkflow;
pub use types::{CandidateRelation, RejectRequestResp, SendRequestResp};
