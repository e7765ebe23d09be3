//! draw.io interchange plugin
//!
//! Reads and writes the uncompressed draw.io XML format:
//!
//! ```text
//! <mxfile>
//!   <diagram id="..." name="...">
//!     <mxGraphModel dx="800" dy="800" grid="1" ...>
//!       <root>
//!         <mxCell id="0"/>
//!         <mxCell id="1" parent="0"/>
//!         <mxCell id="p1" value="Sell" style="fillColor=#B9E0A5" parent="1" vertex="1">
//!           <mxGeometry x="10" y="20" width="100" height="60" as="geometry"/>
//!         </mxCell>
//!       </root>
//!     </mxGraphModel>
//!   </diagram>
//! </mxfile>
//! ```
//!
//! The codec works from the document alone. Element and notation types are
//! inferred from the style strings (see [`inference`]).

pub mod cell;
pub mod inference;
mod parser;
mod renderer;

pub use inference::{infer_element_kind, style_to_shape_kind};
pub use parser::{DrawioParser, UNTITLED_DIAGRAM};
pub use renderer::{connection_wire_style, DrawioRenderer, GRAPH_MODEL_ATTRIBUTES};
