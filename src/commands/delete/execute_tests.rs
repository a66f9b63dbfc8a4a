//! Execute tests for delete command.

#[cfg(test)]
mod tests {
    use super::super::DeleteCmd;
    use crate::config::ConfigFile;
    use crate::test_utils::create_temp_json_file;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn default_config() -> ConfigFile {
        ConfigFile::default()
    }

    crate::execute_test! {
        test_name: test_delete_all,
        fixture: default_config,
        cmd: DeleteCmd {
            labels: vec!["Person".to_string()],
            condition: None,
            params: None,
        },
        assertions: |result| {
            assert_eq!(result.text, "MATCH (n:Person) OPTIONAL MATCH (n)-[r]-() DELETE n,r");
            assert!(result.params.is_empty());
        },
    }

    #[rstest]
    fn test_delete_with_condition_file(default_config: ConfigFile) {
        use crate::commands::Execute;
        let condition = create_temp_json_file(r#"{ "hash": { "id": "7", "archived": true } }"#);
        let cmd = DeleteCmd {
            labels: vec!["Post".to_string()],
            condition: Some(condition.path().to_path_buf()),
            params: None,
        };
        let result = cmd.execute(&default_config).unwrap();
        assert_eq!(
            result.text,
            "MATCH (n:Post) OPTIONAL MATCH (n)-[r]-() WHERE (id(n)={p0}) AND (n.archived={p1}) DELETE n,r"
        );
        assert_eq!(result.params.get("p0"), Some(&json!(7)));
        assert_eq!(result.params.get("p1"), Some(&json!(true)));
    }

    #[rstest]
    fn test_delete_honours_identifiers() {
        use crate::commands::Execute;
        let config: ConfigFile =
            serde_json::from_str(r#"{ "builder": { "identifier": "x", "relation_identifier": "e" } }"#).unwrap();
        let cmd = DeleteCmd {
            labels: vec!["Tag".to_string()],
            condition: None,
            params: None,
        };
        assert_eq!(
            cmd.execute(&config).unwrap().text,
            "MATCH (x:Tag) OPTIONAL MATCH (x)-[e]-() DELETE x,e"
        );
    }

    crate::execute_error_test! {
        test_name: test_invalid_condition_file,
        fixture: default_config,
        cmd: DeleteCmd {
            labels: vec!["Person".to_string()],
            condition: Some(create_temp_json_file(r#"{ "between": [1, 2] }"#).path().to_path_buf()),
            params: None,
        },
        contains: "Invalid JSON",
    }
}
