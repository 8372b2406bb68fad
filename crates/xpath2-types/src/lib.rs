//! XPath 2.0 typed value system.
//!
//! The crate covers the XML Schema atomic types that flow through an XPath
//! expression tree once navigation has produced items: their lexical parsing
//! and canonical forms, the casting matrix, value comparison, arithmetic and
//! the F&O function library with its argument conversion rules.

pub mod consts;
pub mod engine;
pub mod model;
pub mod temporal;
pub mod xdm;

pub use engine::arithmetic::{ArithmeticOp, arithmetic, negate};
pub use engine::casting::{CastRule, cast, cast_rule, cast_to_name, cast_with, is_castable};
pub use engine::comparison::{ComparisonOp, compare_atomic, general_compare_atomic, value_eq};
pub use engine::functions::{FunctionLibrary, FunctionSignature, Occurrence, ParamTypeSpec};
pub use engine::runtime::{
    CallCtx, Error, ErrorCode, ErrorKind, NamespaceBindings, StaticContext, StaticContextBuilder,
};
pub use model::{SimpleNode, XdmNode};
pub use temporal::duration::{DayTimeDuration, XsDuration, YearMonthDuration};
pub use temporal::{GDay, GMonth, GMonthDay, GYear, GYearMonth, Temporal, XsDate, XsDateTime, XsTime};
pub use xdm::{AtomicKind, ExpandedName, IntegerKind, XdmAtomicValue, XdmItem, XdmSequence, XsInteger};
