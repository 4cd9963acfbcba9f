use zeroize::Zeroize;

#[derive(Serialize, Deserialize, Clone)]
pub struct Key {
    pub verkey: String,
    pub signkey: String,
}

impl Key {
    pub fn new(verkey: String, signkey: String) -> Key {
        Key { verkey, signkey }
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("verkey", &self.verkey)
            .field("signkey", &"***")
            .finish()
    }
}

impl Zeroize for Key {
    fn zeroize(&mut self) {
        self.signkey.zeroize();
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.signkey.zeroize();
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct KeyInfo {
    pub seed: Option<String>,
    pub crypto_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct KeyMetadata {
    pub value: String,
}
