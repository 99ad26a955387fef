//! Template instantiation descriptors.
//!
//! Descriptors are inert data read by an external code generator, which
//! uses them to name the instantiations of C++ templates and the type
//! definitions generated for their parameters. Nothing here interprets
//! them beyond serialization.

use serde::ser::{Serialize, Serializer};

use crate::Result;

/// Generated type name bound to a logical type parameter, along with its
/// default value. An empty default means there is none.
///
/// Serialized as a `[type_name, default]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeBinding {
    pub type_name: &'static str,
    pub default: &'static str,
}

impl Serialize for TypeBinding {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.type_name, self.default).serialize(serializer)
    }
}

/// Describes a single template specialization.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateDescriptor {
    /// Fully qualified name of the template being instantiated.
    pub template_name: &'static str,
    /// Name of the instantiation unless specified otherwise.
    pub default_name: &'static str,
    /// Logical parameter names, in positional order.
    pub arguments_order: &'static [&'static str],
    /// Type definitions for logical parameter names, including ones that
    /// aren't template arguments.
    #[serde(serialize_with = "serialize_typedefs")]
    pub typedefs: &'static [(&'static str, TypeBinding)],
}

impl TemplateDescriptor {
    pub fn typedef(&self, name: &str) -> Option<&TypeBinding> {
        self.typedefs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, binding)| binding)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    #[cfg(feature = "yaml")]
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn serialize_typedefs<S>(
    typedefs: &&'static [(&'static str, TypeBinding)],
    serializer: S,
) -> core::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(typedefs.iter().map(|(name, binding)| (name, binding)))
}

const fn bind(type_name: &'static str) -> TypeBinding {
    TypeBinding {
        type_name,
        default: "",
    }
}

/// Three dimensional cell complex, with vertex, edge, face and cell
/// parameters plus their oriented counterparts.
pub const CELL_COMPLEX_3D: TemplateDescriptor = TemplateDescriptor {
    template_name: "cellflips::CellComplex",
    default_name: "CellComplex3D",
    arguments_order: &["vertex", "edge", "face", "cell"],
    typedefs: &[
        ("vertex", bind("vertex_t")),
        ("edge", bind("edge_t")),
        ("face", bind("face_t")),
        ("cell", bind("cell_t")),
        ("oriented_vertex", bind("oriented_vertex_t")),
        ("oriented_edge", bind("oriented_edge_t")),
        ("oriented_face", bind("oriented_face_t")),
        ("oriented_cell", bind("oriented_cell_t")),
    ],
};
