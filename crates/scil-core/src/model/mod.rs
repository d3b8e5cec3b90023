//! Domain models: catalog entries, source rows, findings, and the audit
//! resolution types layered on top of them.

mod entity;
mod estado;
mod finding;
mod solventacion;
mod source_row;
mod user;

pub use entity::{Ambito, Entity};
pub use estado::{estatus_label, fuse, Estado, MIXTO, NO_SOLVENTADO, SIN_VALORACION, SOLVENTADO};
pub use finding::{Finding, TipoPatron, SIN_DUPLICIDAD_FECHA};
pub use solventacion::{Solventacion, GENERAL};
pub use source_row::SourceRow;
pub use user::{User, ALL, TODOS};
