//! Common utils for integration tests

use copy_dir::copy_dir;
use murmur3::murmur3_32;
use std::{
    io::BufReader,
    path::{Path, PathBuf},
};
use zupply::log::LogContext;

pub struct ItEnv {
    context: LogContext,
    test_description: String,
    test_dir: PathBuf,
}

impl ItEnv {
    pub fn new(fixture_name: &str) -> Self {
        let test_description = fixture_name.to_string();
        let mut read = BufReader::new(test_description.as_bytes());
        let test_name = format!(
            "test-{}",
            murmur3_32(&mut read, test_description.len().try_into().unwrap()).unwrap()
        );
        // create test directory
        let root_path = Path::new("target/test_out");
        if !root_path.exists() {
            std::fs::create_dir_all(root_path).unwrap();
        }
        let path = root_path.join(test_name);
        if path.exists() {
            std::fs::remove_dir_all(&path).unwrap();
        }

        // copy fixture directory to test directory
        copy_dir(Path::new("tests").join(fixture_name), &path).unwrap();

        Self {
            context: LogContext::new(),
            test_description,
            test_dir: path,
        }
    }

    #[inline]
    pub fn execute<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        f(self)
    }

    #[inline]
    pub fn ctx(&self) -> &LogContext {
        &self.context
    }

    #[inline]
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.test_dir.join(file_name)
    }

    /// Load a config file from the test directory
    pub fn load(&self, file_name: &str) -> zupply::error::Result<()> {
        self.context.config_from_file(&self.path(file_name))
    }

    pub fn read_file(&self, file_name: &str) -> String {
        let path = self.path(file_name);
        assert!(
            path.exists(),
            "file `{}` does not exist in test `{}` ({})",
            file_name,
            self.test_description,
            self.test_dir.display()
        );
        // line endings are normalized to compare against the expected text
        std::fs::read_to_string(path).unwrap().replace("\r\n", "\n")
    }

    pub fn assert_file_eq(&self, file_name: &str, expected: &str) {
        assert_eq!(
            expected,
            self.read_file(file_name),
            "file comparison failed in test `{}` ({})",
            self.test_description,
            self.test_dir.display()
        );
    }

    /// Names of the files in the test directory starting with `prefix`
    pub fn files_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut names = std::fs::read_dir(&self.test_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with(prefix))
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Names of the files in the test directory with extension `ext`
    pub fn files_with_ext(&self, ext: &str) -> Vec<String> {
        let mut names = std::fs::read_dir(&self.test_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().map_or(false, |e| e == ext))
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[inline]
    pub fn assert_path_exists(&self, path_name: &str, exists: bool) {
        assert_eq!(
            exists,
            self.test_dir.join(path_name).exists(),
            "file existence test failed in test `{}` ({})",
            self.test_description,
            self.test_dir.display()
        );
    }
}

macro_rules! testit {
    ($test_name:ident, $fnonce:expr) => {
        #[test]
        #[allow(non_snake_case)]
        fn $test_name() {
            let mut env = ItEnv::new(&stringify!($test_name).replace("__", "/"));
            env.execute($fnonce);
        }
    };
}

pub(crate) use testit;
