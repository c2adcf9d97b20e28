use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::tokener::{Payload, Tokener};
use crate::error::Error;

pub struct JWT {
    secret: Vec<u8>,
}

impl JWT {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<P> Tokener<P> for JWT
where
    P: Payload,
{
    fn gen_token(&self, payload: &P) -> Result<String, Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(&self.secret);
        let token = encode(&header, payload, &key)?;
        Ok(token)
    }
    fn verify_token(&self, token: &str) -> Result<P, Error> {
        let key = DecodingKey::from_secret(&self.secret);
        let validation = Validation::new(Algorithm::HS256);
        let payload = decode(token, &key, &validation)?;
        Ok(payload.claims)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::middlewares::jwt::Claim;
    use std::ops::Add;
    use uuid::Uuid;

    fn claim_for(user: Uuid) -> Claim {
        Claim {
            user: user.to_string(),
            exp: chrono::Utc::now().add(chrono::Duration::hours(1)).timestamp(),
        }
    }

    #[test]
    fn test_gen_and_verify_token() {
        let jwt = JWT::new(b"sahyog-test-secret".to_vec());
        let user = Uuid::new_v4();
        let token = jwt.gen_token(&claim_for(user)).unwrap();
        let claim: Claim = jwt.verify_token(&token).unwrap();
        assert_eq!(claim.user, user.to_string());
    }

    #[test]
    fn test_tokens_are_user_specific() {
        let jwt = JWT::new(b"sahyog-test-secret".to_vec());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let token_a = jwt.gen_token(&claim_for(a)).unwrap();
        let token_b = jwt.gen_token(&claim_for(b)).unwrap();
        let claim_a: Claim = jwt.verify_token(&token_a).unwrap();
        let claim_b: Claim = jwt.verify_token(&token_b).unwrap();
        assert_eq!(claim_a.user, a.to_string());
        assert_eq!(claim_b.user, b.to_string());
    }

    #[test]
    fn test_expired_token_is_refused() {
        let jwt = JWT::new(b"sahyog-test-secret".to_vec());
        let claim = Claim {
            user: Uuid::new_v4().to_string(),
            exp: chrono::Utc::now().timestamp() - 3600,
        };
        let token = jwt.gen_token(&claim).unwrap();
        assert!(<JWT as Tokener<Claim>>::verify_token(&jwt, &token).is_err());
    }

    #[test]
    fn test_wrong_secret_is_refused() {
        let jwt = JWT::new(b"sahyog-test-secret".to_vec());
        let other = JWT::new(b"another-secret".to_vec());
        let token = jwt.gen_token(&claim_for(Uuid::new_v4())).unwrap();
        assert!(<JWT as Tokener<Claim>>::verify_token(&other, &token).is_err());
    }
}
