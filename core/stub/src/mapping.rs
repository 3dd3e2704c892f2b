// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use crate::api::v1::{HelloWorldRequest, HelloWorldResponse};
use crate::errors::RpcError;

pub const NO_MATCHING_REQUEST: &str = "no matching request found";

/// A canned request and the response returned when an equal request arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping<Req, Resp> {
    pub request: Req,
    pub response: Resp,
}

impl<Req, Resp> Mapping<Req, Resp> {
    pub fn new(request: Req, response: Resp) -> Self {
        Mapping { request, response }
    }
}

/// Return the response of the first mapping whose request equals `request`.
///
/// Equality is the value equality of the message, field by field, so callers
/// can build requests independently of the table.
pub fn find_matching_response<Req, Resp>(
    request: &Req,
    mappings: &[Mapping<Req, Resp>],
) -> Result<Resp, RpcError>
where
    Req: PartialEq,
    Resp: Clone,
{
    mappings
        .iter()
        .find(|mapping| mapping.request == *request)
        .map(|mapping| mapping.response.clone())
        .ok_or_else(|| RpcError::NotFound(NO_MATCHING_REQUEST.to_string()))
}

/// Mapping tables of the operations answered with canned responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTables {
    pub hello_world: Vec<Mapping<HelloWorldRequest, HelloWorldResponse>>,
}

impl MappingTables {
    pub fn builtin() -> Self {
        MappingTables {
            hello_world: vec![
                greeting("", "Hello, empty!"),
                greeting("test", "Hello, test!"),
                greeting("world", "Hello, world!"),
            ],
        }
    }
}

pub(crate) fn greeting(name: &str, message: &str) -> Mapping<HelloWorldRequest, HelloWorldResponse> {
    Mapping::new(
        HelloWorldRequest {
            name: name.to_string(),
        },
        HelloWorldResponse {
            message: message.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::v1::{ProjectAssignDiskDirsRequest, ProjectAssignDiskDirsResponse};

    #[test]
    fn test_builtin_greetings() {
        let tables = MappingTables::builtin();

        let cases = [
            ("", "Hello, empty!"),
            ("test", "Hello, test!"),
            ("world", "Hello, world!"),
        ];
        for (name, expected) in cases {
            let req = HelloWorldRequest {
                name: name.to_string(),
            };
            let resp = find_matching_response(&req, &tables.hello_world).unwrap();
            assert_eq!(resp.message, expected);
        }
    }

    #[test]
    fn test_no_match_is_not_found() {
        let tables = MappingTables::builtin();
        let req = HelloWorldRequest {
            name: "unknown".to_string(),
        };

        let err = find_matching_response(&req, &tables.hello_world).unwrap_err();
        assert_eq!(err, RpcError::NotFound(NO_MATCHING_REQUEST.to_string()));

        let empty: &[Mapping<HelloWorldRequest, HelloWorldResponse>] = &[];
        let err = find_matching_response(&req, empty).unwrap_err();
        assert!(matches!(err, RpcError::NotFound(_)));
    }

    #[test]
    fn test_first_match_wins() {
        let mappings = vec![greeting("dup", "first"), greeting("dup", "second")];
        let req = HelloWorldRequest {
            name: "dup".to_string(),
        };

        assert_eq!(
            find_matching_response(&req, &mappings).unwrap().message,
            "first"
        );
    }

    #[test]
    fn test_repeated_fields_compare_by_value() {
        let mappings = vec![Mapping::new(
            ProjectAssignDiskDirsRequest {
                project: "p".to_string(),
                disc_dirs: vec!["a".to_string(), "b".to_string()],
            },
            ProjectAssignDiskDirsResponse {},
        )];

        let same = ProjectAssignDiskDirsRequest {
            project: "p".to_string(),
            disc_dirs: vec!["a".to_string(), "b".to_string()],
        };
        assert!(find_matching_response(&same, &mappings).is_ok());

        let reordered = ProjectAssignDiskDirsRequest {
            project: "p".to_string(),
            disc_dirs: vec!["b".to_string(), "a".to_string()],
        };
        assert!(find_matching_response(&reordered, &mappings).is_err());
    }
}
