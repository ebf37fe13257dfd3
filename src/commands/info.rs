use crate::store::TransactionStore;

pub struct InfoResult {
    pub data_file: String,
    pub transactions: usize,
    pub git_sha: String,
}

pub fn command_info(store: &TransactionStore) -> InfoResult {
    InfoResult {
        data_file: store.location(),
        transactions: store.len(),
        git_sha: env!("VERGEN_GIT_SHA").to_string(),
    }
}

#[cfg(test)]
mod info_tests {
    use super::*;
    use crate::store::open_testing_store;
    use crate::store::testing::insert_test_data;

    #[test]
    fn info_test() {
        let mut store = open_testing_store();
        insert_test_data(&mut store);
        let info = command_info(&store);
        // The testing store keeps everything in memory.
        assert_eq!(info.data_file, "memory");
        assert_eq!(info.transactions, 4);
        assert!(!info.git_sha.is_empty());
    }
}
