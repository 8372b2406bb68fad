pub mod arithmetic;
pub mod casting;
pub mod comparison;
pub mod functions;
pub(crate) mod numeric;
pub mod runtime;
