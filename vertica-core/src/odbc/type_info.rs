use crate::type_info::{DataKind, VerticaTypeInfo};
use odbc_api::DataType;

/// Maps the SQL data type reported by `SQLDescribeCol` onto a Vertica type name.
pub(crate) fn type_info_from_data_type(data_type: DataType) -> VerticaTypeInfo {
    let (name, kind) = match data_type {
        DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt => {
            ("INTEGER", DataKind::Integer)
        }
        DataType::Real | DataType::Float { .. } | DataType::Double => ("FLOAT", DataKind::Float),
        DataType::Decimal { .. } | DataType::Numeric { .. } => ("NUMERIC", DataKind::Numeric),
        DataType::Bit => ("BOOLEAN", DataKind::Boolean),
        DataType::Date => ("DATE", DataKind::Date),
        DataType::Time { .. } => ("TIME", DataKind::Time),
        DataType::Timestamp { .. } => ("TIMESTAMP", DataKind::Timestamp),
        DataType::Char { .. } | DataType::WChar { .. } => ("CHAR", DataKind::Text),
        DataType::Varchar { .. } | DataType::WVarchar { .. } => ("VARCHAR", DataKind::Text),
        DataType::LongVarchar { .. } | DataType::WLongVarchar { .. } => {
            ("LONG VARCHAR", DataKind::Text)
        }
        DataType::Binary { .. } => ("BINARY", DataKind::Binary),
        DataType::Varbinary { .. } => ("VARBINARY", DataKind::Binary),
        DataType::LongVarbinary { .. } => ("LONG VARBINARY", DataKind::Binary),
        DataType::Other { .. } | DataType::Unknown => ("UNKNOWN", DataKind::Unknown),
    };

    VerticaTypeInfo::new(name, kind)
}
