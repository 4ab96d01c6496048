/*!
Joint descriptions, live joint instances, and their exchange records.
*/

mod instance;
mod spec;
mod summary;

pub use instance::JointInstance;
pub use spec::{AnchorPolicy, JointAxis, JointSpec, JointType, SpringDamper};
pub use summary::JointSummary;
