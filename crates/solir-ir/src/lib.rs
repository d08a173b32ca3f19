/*! Flat intermediate representation of Solidity contracts.
 *
 * The AST keeps every syntactic detail; consumers that verify bytecode or
 * detect token standards want the summary instead: which functions with
 * which selectors, which events with which topics, which bases. The lowerer
 * collapses each source unit into one [`Contract`] and the standards
 * detector tags the root with the EIPs the surface satisfies.
 */

mod builder;
mod contract;
mod root;
mod selectors;
mod standards;

pub use builder::lower;
pub use contract::{
    Contract, Enum, Error, Event, Function, Modifier, Parameter, StateVariable, Struct,
};
pub use root::{Eip, Root};
pub use selectors::{event_topic, function_selector, keccak256};
pub use standards::{registry, Standard, StandardDefinition, StandardEvent, StandardFunction};
