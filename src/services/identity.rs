use std::fs;

#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Direct,
    Proxy(String),
}

/// Cycles a fixed pool of egress identities. The pool is never empty: an
/// absent or unreadable source degenerates to a single direct connection.
pub struct IdentityRotator {
    pool: Vec<Identity>,
    cursor: usize,
}

impl IdentityRotator {
    pub fn direct() -> Self {
        IdentityRotator {
            pool: vec![Identity::Direct],
            cursor: 0,
        }
    }

    pub fn from_pool(pool: Vec<Identity>) -> Self {
        match pool.is_empty() {
            true => Self::direct(),
            false => IdentityRotator { pool, cursor: 0 },
        }
    }

    pub fn from_source(source: Option<&str>) -> Self {
        match source {
            None => Self::direct(),
            Some(path) => match fs::read_to_string(path) {
                Ok(contents) => Self::from_pool(parse_pool(&contents)),
                Err(e) => {
                    log::error!("Could not read identity pool {}: {}", path, e);
                    Self::direct()
                }
            },
        }
    }

    pub fn next(&mut self) -> Identity {
        let identity = self.pool[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.pool.len();
        identity
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }
}

fn parse_pool(contents: &str) -> Vec<Identity> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| Identity::Proxy(line.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_cyclic() {
        let mut rotator = IdentityRotator::from_pool(vec![
            Identity::Proxy("p1:8080".to_string()),
            Identity::Proxy("p2:8080".to_string()),
        ]);

        assert_eq!(rotator.next(), Identity::Proxy("p1:8080".to_string()));
        assert_eq!(rotator.next(), Identity::Proxy("p2:8080".to_string()));
        assert_eq!(rotator.next(), Identity::Proxy("p1:8080".to_string()));
    }

    #[test]
    fn empty_pool_always_draws_direct() {
        let mut rotator = IdentityRotator::from_pool(vec![]);

        for _ in 0..3 {
            assert_eq!(rotator.next(), Identity::Direct);
        }
    }

    #[test]
    fn absent_source_is_direct() {
        let mut rotator = IdentityRotator::from_source(None);

        assert_eq!(rotator.pool_len(), 1);
        assert_eq!(rotator.next(), Identity::Direct);
    }

    #[test]
    fn unreadable_source_falls_back_to_direct() {
        let mut rotator = IdentityRotator::from_source(Some("/no/such/proxies.txt"));

        assert_eq!(rotator.next(), Identity::Direct);
    }

    #[test]
    fn pool_parsing_skips_blanks_and_comments() {
        let pool = parse_pool("p1:8080\n\n# staging only\n  p2:8080  \n");

        assert_eq!(
            pool,
            vec![
                Identity::Proxy("p1:8080".to_string()),
                Identity::Proxy("p2:8080".to_string()),
            ]
        );
    }

    #[test]
    fn source_file_round_trip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "p1:8080\np2:8080").unwrap();

        let mut rotator = IdentityRotator::from_source(file.path().to_str());

        assert_eq!(rotator.pool_len(), 2);
        assert_eq!(rotator.next(), Identity::Proxy("p1:8080".to_string()));
    }
}
