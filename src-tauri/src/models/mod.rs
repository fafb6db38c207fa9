pub mod ticket;
pub mod turno;
pub mod cierre;
pub mod usuario;
pub mod configuracion;
pub mod deteccion;
pub mod actividad;

pub use ticket::*;
pub use turno::*;
pub use cierre::*;
pub use usuario::*;
pub use configuracion::*;
pub use deteccion::*;
pub use actividad::*;
