use std::error::Error;

pub type BoxError = Box<dyn Error + Send + Sync>;

pub type BoxResult<T> = Result<T, BoxError>;

/// Walks the source chain looking for a reqwest connection failure.
pub fn is_connect_error(e: &(dyn Error + 'static)) -> bool {
    let mut current = Some(e);
    while let Some(err) = current {
        if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>() {
            if reqwest_err.is_connect() || reqwest_err.is_timeout() {
                return true;
            }
        }
        current = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_io_error_is_not_connect_error() {
        let err: BoxError = Box::new(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!is_connect_error(err.as_ref()));
    }
}
