// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! A codec for the [Apache Avro](https://avro.apache.org/) binary data
//! format, version 1.7.7: compact, schema-driven and self-contained per
//! datum.
//!
//! A schema is written as a JSON document. Compiling it yields a [`Codec`],
//! an immutable pairing of the schema with its decode and encode
//! operations. The codec reads datums from any [`std::io::Read`] and writes
//! them to any [`std::io::Write`]; it carries no per-stream state, so one
//! compiled codec serves any number of independent streams, concurrently.
//!
//! ```
//! use avro_datum::{Codec, types::{Record, Value}};
//!
//! let codec = Codec::new(r#"
//!     {
//!         "type": "record",
//!         "name": "test",
//!         "fields": [
//!             {"name": "a", "type": "long", "default": 42},
//!             {"name": "b", "type": "string"}
//!         ]
//!     }
//! "#)?;
//!
//! let mut record = Record::new(codec.schema()).unwrap();
//! record.put("a", 27i64);
//! record.put("b", "foo");
//!
//! let encoded = codec.encode_to_vec(&record.into())?;
//! let decoded = codec.decode(&mut encoded.as_slice())?;
//!
//! assert_eq!(
//!     decoded,
//!     Value::Record(vec![
//!         ("a".into(), Value::Long(27)),
//!         ("b".into(), Value::String("foo".into())),
//!     ])
//! );
//! # Ok::<(), avro_datum::Error>(())
//! ```
//!
//! Datums are encoded without any framing: no magic bytes, no checksums, no
//! length prefixes. Object Container Files, JSON-encoded datums and
//! writer/reader schema resolution are out of scope.
//!
//! Schemas with recursive references compile and run fine:
//!
//! ```
//! use avro_datum::Codec;
//!
//! let codec = Codec::new(r#"
//!     {
//!         "type": "record",
//!         "name": "LongList",
//!         "fields": [
//!             {"name": "value", "type": "long"},
//!             {"name": "next", "type": ["null", "LongList"]}
//!         ]
//!     }
//! "#)?;
//! # let _ = codec;
//! # Ok::<(), avro_datum::Error>(())
//! ```

mod codec;
mod decode;
mod encode;
pub mod error;
pub mod schema;
mod schema_equality;
pub mod types;
pub mod util;
mod validator;

pub use codec::{Codec, from_avro_datum, to_avro_datum};
pub use error::Error;
pub use schema::Schema;

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use crate::{Codec, types::Value};
    use pretty_assertions::assert_eq;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn test_crate_level_round_trip() -> TestResult {
        let codec = Codec::new(r#"["null", "string"]"#)?;
        let value = Value::Union(1, Box::new(Value::String("hi".into())));
        let encoded = codec.encode_to_vec(&value)?;
        assert_eq!(encoded, vec![0x02, 0x04, 0x68, 0x69]);
        assert_eq!(codec.decode(&mut encoded.as_slice())?, value);
        Ok(())
    }
}
