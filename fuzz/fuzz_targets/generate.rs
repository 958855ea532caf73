#![no_main]
use arrayref::array_ref;
use libfuzzer_sys::fuzz_target;
use nanoid_columns::Generator;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let size = u16::from_le_bytes(*array_ref![data, 0, 2]) as usize % 1024;
    let alphabet = String::from_utf8_lossy(&data[2..]);
    if let Ok(generator) = Generator::with_size_and_alphabet(size, &alphabet) {
        let id = generator.generate();
        assert_eq!(generator.validate(&id), Ok(()));
    }
});
