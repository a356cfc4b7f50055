use std::io::Cursor;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{bitstreams::{BitReader, BitWriter}, ArchiveError, ControlSymbol, FormatError, Symbol};

use super::{CodeTable, Codeword, DecodeTrie, FrequencyTable, HuffmanTree, MAX_CODE_LENGTH};

fn codes_as_strings(table: &CodeTable) -> Vec<(Symbol, String)> {
    table
        .entries()
        .iter()
        .map(|(symbol, code)| (*symbol, code.to_string()))
        .collect()
}

fn code_value(code: &Codeword) -> u128 {
    code.bits().iter().fold(0, |acc, &bit| (acc << 1) | bit as u128)
}

fn random_frequencies(rng: &mut StdRng) -> FrequencyTable {
    let mut table = FrequencyTable::with_control_symbols();
    let distinct = rng.gen_range(1..=256);
    for _ in 0..distinct {
        let symbol = rng.gen_range(0..256) as Symbol;
        for _ in 0..rng.gen_range(1..200) {
            table.add(symbol);
        }
    }
    table
}

#[test]
fn test_control_symbols_only() {
    let table = CodeTable::from_frequencies(&FrequencyTable::with_control_symbols());

    assert_eq!(
        codes_as_strings(&table),
        vec![(258, "0".to_string()), (256, "10".to_string()), (257, "11".to_string())]
    );
    assert_eq!(table.length_histogram(), vec![1, 2]);
}

#[test]
fn test_tree_shape_for_single_byte_file() {
    // Name "a", content "A": five symbols of frequency one.
    let mut frequencies = FrequencyTable::with_control_symbols();
    frequencies.add_bytes(b"a");
    frequencies.add_bytes(b"A");

    let tree = HuffmanTree::build(&frequencies).unwrap();
    let expected = HuffmanTree::merge(
        HuffmanTree::merge(HuffmanTree::Leaf(256), HuffmanTree::Leaf(257)),
        HuffmanTree::merge(
            HuffmanTree::Leaf(258),
            HuffmanTree::merge(HuffmanTree::Leaf(65), HuffmanTree::Leaf(97)),
        ),
    );
    assert_eq!(tree, expected);
    assert_eq!(tree.representative(), 65);

    let table = CodeTable::from_lengths(tree.code_lengths());
    assert_eq!(
        codes_as_strings(&table),
        vec![
            (256, "00".to_string()),
            (257, "01".to_string()),
            (258, "10".to_string()),
            (65, "110".to_string()),
            (97, "111".to_string()),
        ]
    );
    assert_eq!(table.length_histogram(), vec![0, 3, 2]);
}

#[test]
fn test_single_leaf_gets_one_bit() {
    let mut frequencies = FrequencyTable::new();
    frequencies.add_bytes(b"aaaa");

    let tree = HuffmanTree::build(&frequencies).unwrap();
    assert_eq!(tree, HuffmanTree::Leaf(b'a' as Symbol));
    assert_eq!(tree.code_lengths(), vec![(b'a' as Symbol, 1)]);

    let table = CodeTable::from_frequencies(&frequencies);
    assert_eq!(table.get(b'a' as Symbol).unwrap().to_string(), "0");
}

#[test]
fn test_empty_frequencies() {
    assert_eq!(HuffmanTree::build(&FrequencyTable::new()), None);
    assert!(CodeTable::from_frequencies(&FrequencyTable::new()).is_empty());
}

#[test]
fn test_frequency_table() {
    let mut frequencies = FrequencyTable::with_control_symbols();
    frequencies.add_bytes(b"hello");

    assert_eq!(frequencies.get(b'l' as Symbol), 2);
    assert_eq!(frequencies.get(ControlSymbol::ArchiveEnd.symbol()), 1);
    assert_eq!(frequencies.get(b'z' as Symbol), 0);
    assert_eq!(frequencies.distinct(), 7);
    assert_eq!(frequencies.present().next(), Some((b'e' as Symbol, 1)));
}

#[test]
fn test_build_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..20 {
        let frequencies = random_frequencies(&mut rng);

        let first = HuffmanTree::build(&frequencies).unwrap();
        let second = HuffmanTree::build(&frequencies.clone()).unwrap();
        assert_eq!(first, second);

        let mut first_lengths = first.code_lengths();
        let mut second_lengths = second.code_lengths();
        first_lengths.sort_by_key(|&(s, l)| (l, s));
        second_lengths.sort_by_key(|&(s, l)| (l, s));
        assert_eq!(first_lengths, second_lengths);

        assert_eq!(CodeTable::from_lengths(first_lengths), CodeTable::from_lengths(second_lengths));
    }
}

#[test]
fn test_canonical_form() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let table = CodeTable::from_frequencies(&random_frequencies(&mut rng));
        let entries = table.entries();

        for pair in entries.windows(2) {
            let (prev_symbol, prev) = &pair[0];
            let (symbol, code) = &pair[1];

            assert!((prev.len(), prev_symbol) < (code.len(), symbol));
            let expected = (code_value(prev) + 1) << (code.len() - prev.len());
            assert_eq!(code_value(code), expected);
        }

        // Kraft equality: a Huffman code over two or more symbols is complete.
        let max = table.max_code_length();
        let kraft: u128 = entries.iter().map(|(_, code)| 1u128 << (max - code.len())).sum();
        assert_eq!(kraft, 1u128 << max);
    }
}

#[test]
fn test_optimal_lengths() {
    let mut frequencies = FrequencyTable::new();
    for (symbol, count) in [(b'a', 45), (b'b', 13), (b'c', 12), (b'd', 16), (b'e', 9), (b'f', 5)] {
        for _ in 0..count {
            frequencies.add(symbol as Symbol);
        }
    }

    let table = CodeTable::from_frequencies(&frequencies);
    let cost: u64 = table
        .entries()
        .iter()
        .map(|(symbol, code)| frequencies.get(*symbol) * code.len() as u64)
        .sum();

    assert_eq!(cost, 224);
    assert_eq!(table.get(b'a' as Symbol).unwrap().len(), 1);
}

#[test]
fn test_header_reconstruction() {
    let mut rng = StdRng::seed_from_u64(1234);

    for _ in 0..20 {
        let table = CodeTable::from_frequencies(&random_frequencies(&mut rng));
        let symbols: Vec<Symbol> = table.entries().iter().map(|(s, _)| *s).collect();

        let rebuilt = CodeTable::from_header(&symbols, &table.length_histogram()).unwrap();
        assert_eq!(rebuilt, table);
    }
}

#[test]
fn test_header_reconstruction_errors() {
    assert_eq!(CodeTable::from_header(&[1, 2, 3], &[1, 1]), Err(FormatError::InvalidCodeTable));
    assert_eq!(CodeTable::from_header(&[1, 1], &[2]), Err(FormatError::InvalidCodeTable));
    assert_eq!(CodeTable::from_header(&[300], &[1]), Err(FormatError::UnknownSymbol(300)));

    let mut too_long = vec![0; MAX_CODE_LENGTH];
    too_long.push(2);
    assert_eq!(CodeTable::from_header(&[0, 1], &too_long), Err(FormatError::InvalidCodeTable));
}

#[test]
fn test_trie_rejects_non_prefix_codes() {
    let mut trie = DecodeTrie::new();

    trie.insert(1, &Codeword::from("01")).unwrap();
    assert_eq!(trie.insert(2, &Codeword::from("01")), Err(FormatError::InvalidCodeTable));
    assert_eq!(trie.insert(3, &Codeword::from("011")), Err(FormatError::InvalidCodeTable));
    assert_eq!(trie.insert(4, &Codeword::from("0")), Err(FormatError::InvalidCodeTable));
    assert_eq!(trie.insert(5, &Codeword::from("")), Err(FormatError::InvalidCodeTable));
    trie.insert(6, &Codeword::from("1")).unwrap();
}

#[test]
fn test_trie_unknown_path() {
    let table = CodeTable::from_lengths(vec![(7, 1)]);
    let trie = DecodeTrie::from_table(&table).unwrap();

    let mut reader = BitReader::new(Cursor::new(vec![0b0100_0000u8]));
    assert_eq!(trie.decode_symbol(&mut reader).unwrap(), 7);
    assert!(matches!(
        trie.decode_symbol(&mut reader),
        Err(ArchiveError::Corrupt(FormatError::InvalidCode))
    ));
}

#[test]
fn test_trie_truncated_code() {
    let table = CodeTable::from_lengths(vec![(2, 9), (3, 9)]);
    let trie = DecodeTrie::from_table(&table).unwrap();

    let mut writer = BitWriter::new(Vec::new());
    table.get(3).unwrap().write_to(&mut writer).unwrap();
    writer.flush().unwrap();

    // Nine code bits plus seven padding bits: the padding cannot finish another 9-bit code.
    let mut reader = BitReader::new(Cursor::new(writer.into_inner()));
    assert_eq!(trie.decode_symbol(&mut reader).unwrap(), 3);
    assert!(matches!(
        trie.decode_symbol(&mut reader),
        Err(ArchiveError::Corrupt(FormatError::Truncated { .. }))
    ));
}

#[test]
fn test_codes_longer_than_a_request() {
    // Fibonacci counts give the deepest possible tree.
    let mut frequencies = FrequencyTable::new();
    let (mut a, mut b) = (1u64, 1u64);
    for symbol in 0..40 {
        frequencies.add_count(symbol, a);
        (a, b) = (b, a + b);
    }

    let table = CodeTable::from_frequencies(&frequencies);
    assert!(table.max_code_length() > 32);

    let trie = DecodeTrie::from_table(&table).unwrap();
    let symbols: Vec<Symbol> = table.entries().iter().map(|(s, _)| *s).rev().collect();

    let mut writer = BitWriter::new(Vec::new());
    for &s in symbols.iter() {
        table.get(s).unwrap().write_to(&mut writer).unwrap();
    }
    writer.flush().unwrap();

    let mut reader = BitReader::new(Cursor::new(writer.into_inner()));
    for &s in symbols.iter() {
        assert_eq!(trie.decode_symbol(&mut reader).unwrap(), s);
    }
}
