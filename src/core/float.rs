use num_traits::{Float, FromPrimitive, Signed};
use std::fmt::Debug;
use std::ops::AddAssign;

// A Float trait that captures what the reference metrics need from a feature
// component. These requirements are imposed by ndarray-stats deviations and by
// the bit-exact equality used when sampling distinct elements.
pub trait MetricFloat:
    Float
    + Debug
    + Default
    + AddAssign
    + Signed
    + Copy
    + Sync
    + Send
    + FromPrimitive
    + 'static
{
}

impl MetricFloat for f32 {}
impl MetricFloat for f64 {}
