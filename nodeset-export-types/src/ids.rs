// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Numeric ids of standard address space nodes the exporter refers to,
//! from OPC UA Part 6 Annex A. Only the ids the pipeline touches are listed.

use crate::node_id::NodeId;

macro_rules! id_enum {
    ($(#[$doc:meta])* $name:ident { $($(#[$vdoc:meta])* $variant:ident = $value:literal,)+ }) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        #[repr(u32)]
        #[allow(non_camel_case_types)]
        pub enum $name {
            $($(#[$vdoc])* $variant = $value,)+
        }

        impl From<$name> for NodeId {
            fn from(value: $name) -> Self {
                NodeId::new(0, value as u32)
            }
        }

        impl PartialEq<$name> for NodeId {
            fn eq(&self, other: &$name) -> bool {
                *self == (0u16, *other as u32)
            }
        }
    };
}

id_enum! {
    /// Standard reference type nodes.
    ReferenceTypeId {
        /// Root of the reference type hierarchy.
        References = 31,
        /// Non-hierarchical references.
        NonHierarchicalReferences = 32,
        /// Hierarchical references.
        HierarchicalReferences = 33,
        /// HasChild.
        HasChild = 34,
        /// Organizes.
        Organizes = 35,
        /// HasEventSource.
        HasEventSource = 36,
        /// HasModellingRule.
        HasModellingRule = 37,
        /// HasEncoding.
        HasEncoding = 38,
        /// HasDescription.
        HasDescription = 39,
        /// HasTypeDefinition.
        HasTypeDefinition = 40,
        /// GeneratesEvent.
        GeneratesEvent = 41,
        /// Aggregates.
        Aggregates = 44,
        /// HasSubtype.
        HasSubtype = 45,
        /// HasProperty.
        HasProperty = 46,
        /// HasComponent.
        HasComponent = 47,
        /// HasNotifier.
        HasNotifier = 48,
        /// HasOrderedComponent.
        HasOrderedComponent = 49,
    }
}

id_enum! {
    /// Standard data type nodes.
    DataTypeId {
        /// Boolean.
        Boolean = 1,
        /// SByte.
        SByte = 2,
        /// Byte.
        Byte = 3,
        /// Int16.
        Int16 = 4,
        /// UInt16.
        UInt16 = 5,
        /// Int32.
        Int32 = 6,
        /// UInt32.
        UInt32 = 7,
        /// Int64.
        Int64 = 8,
        /// UInt64.
        UInt64 = 9,
        /// Float.
        Float = 10,
        /// Double.
        Double = 11,
        /// String.
        String = 12,
        /// DateTime.
        DateTime = 13,
        /// Guid.
        Guid = 14,
        /// ByteString.
        ByteString = 15,
        /// XmlElement.
        XmlElement = 16,
        /// NodeId.
        NodeId = 17,
        /// ExpandedNodeId.
        ExpandedNodeId = 18,
        /// StatusCode.
        StatusCode = 19,
        /// QualifiedName.
        QualifiedName = 20,
        /// LocalizedText.
        LocalizedText = 21,
        /// Structure.
        Structure = 22,
        /// DataValue.
        DataValue = 23,
        /// BaseDataType.
        BaseDataType = 24,
        /// DiagnosticInfo.
        DiagnosticInfo = 25,
        /// Number.
        Number = 26,
        /// Integer.
        Integer = 27,
        /// UInteger.
        UInteger = 28,
        /// Enumeration.
        Enumeration = 29,
        /// Image.
        Image = 30,
    }
}

id_enum! {
    /// Standard object nodes.
    ObjectId {
        /// The root folder.
        RootFolder = 84,
        /// The objects folder.
        ObjectsFolder = 85,
        /// The types folder.
        TypesFolder = 86,
        /// The views folder.
        ViewsFolder = 87,
    }
}

id_enum! {
    /// Standard object type nodes.
    ObjectTypeId {
        /// BaseObjectType.
        BaseObjectType = 58,
        /// FolderType.
        FolderType = 61,
    }
}

id_enum! {
    /// Standard variable type nodes.
    VariableTypeId {
        /// BaseVariableType, abstract.
        BaseVariableType = 62,
        /// BaseDataVariableType.
        BaseDataVariableType = 63,
        /// PropertyType.
        PropertyType = 68,
    }
}

id_enum! {
    /// Standard variable nodes.
    VariableId {
        /// Server_NamespaceArray, the table of namespace URIs.
        Server_NamespaceArray = 2255,
    }
}

#[cfg(test)]
mod tests {
    use super::{DataTypeId, ObjectId, ReferenceTypeId};
    use crate::node_id::NodeId;

    #[test]
    fn conversion_and_comparison() {
        let id: NodeId = ObjectId::ObjectsFolder.into();
        assert_eq!(id.to_string(), "i=85");
        assert_eq!(id, ObjectId::ObjectsFolder);
        assert_eq!(NodeId::new(0, 47u32), ReferenceTypeId::HasComponent);
        assert_ne!(NodeId::new(1, 47u32), ReferenceTypeId::HasComponent);
        assert_eq!(NodeId::new(0, 6u32), DataTypeId::Int32);
    }
}
