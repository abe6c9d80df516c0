//! Recognizes executables this machine can start, from the first bytes of the
//! file and its length. Truncated downloads and binaries for another
//! architecture are rejected here instead of failing at spawn time.

/// How many leading bytes the checks below need at most.
pub const HEADER_LEN: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElfTarget {
    pub machine: Option<u16>,
    pub is_64: bool,
    pub little_endian: bool,
}

fn read_u16(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u16> {
    let raw: [u8; 2] = bytes.get(offset..offset + 2)?.try_into().ok()?;
    Some(if little_endian {
        u16::from_le_bytes(raw)
    } else {
        u16::from_be_bytes(raw)
    })
}

fn read_u32(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(if little_endian {
        u32::from_le_bytes(raw)
    } else {
        u32::from_be_bytes(raw)
    })
}

fn read_u64(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u64> {
    let raw: [u8; 8] = bytes.get(offset..offset + 8)?.try_into().ok()?;
    Some(if little_endian {
        u64::from_le_bytes(raw)
    } else {
        u64::from_be_bytes(raw)
    })
}

const ET_EXEC: u16 = 2;
const ET_DYN: u16 = 3;

#[cfg_attr(any(target_os = "windows", target_os = "macos"), allow(dead_code))]
pub fn is_elf_for(header: &[u8], file_len: u64, target: &ElfTarget) -> bool {
    elf_matches(header, file_len, target).unwrap_or(false)
}

fn elf_matches(header: &[u8], file_len: u64, target: &ElfTarget) -> Option<bool> {
    if !header.starts_with(b"\x7fELF") {
        return Some(false);
    }
    let class = *header.get(4)?;
    let data = *header.get(5)?;
    let version = *header.get(6)?;
    let expected_class = if target.is_64 { 2 } else { 1 };
    let expected_data = if target.little_endian { 1 } else { 2 };
    if class != expected_class || data != expected_data || version != 1 {
        return Some(false);
    }

    let le = target.little_endian;
    let e_type = read_u16(header, 16, le)?;
    if e_type != ET_EXEC && e_type != ET_DYN {
        return Some(false);
    }
    let e_machine = read_u16(header, 18, le)?;
    if target.machine.map_or(false, |machine| machine != e_machine) {
        return Some(false);
    }

    let (header_size, phoff, phentsize, phnum) = if target.is_64 {
        (
            64,
            read_u64(header, 32, le)?,
            read_u16(header, 54, le)?,
            read_u16(header, 56, le)?,
        )
    } else {
        (
            52,
            read_u32(header, 28, le)? as u64,
            read_u16(header, 42, le)?,
            read_u16(header, 44, le)?,
        )
    };
    if phnum == 0 || file_len < header_size {
        return Some(false);
    }
    let table_end = phoff.checked_add(phentsize as u64 * phnum as u64)?;
    Some(table_end <= file_len)
}

const MH_MAGIC_64: [u8; 4] = [0xcf, 0xfa, 0xed, 0xfe];
const FAT_MAGIC: [u8; 4] = [0xca, 0xfe, 0xba, 0xbe];
const MH_EXECUTE: u32 = 2;

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub fn is_macho_for(header: &[u8], file_len: u64, cputype: u32) -> bool {
    macho_matches(header, file_len, cputype).unwrap_or(false)
}

fn macho_matches(header: &[u8], file_len: u64, cputype: u32) -> Option<bool> {
    if header.starts_with(&MH_MAGIC_64) {
        let sizeofcmds = read_u32(header, 20, true)? as u64;
        return Some(
            read_u32(header, 4, true)? == cputype
                && read_u32(header, 12, true)? == MH_EXECUTE
                && 32 + sizeofcmds <= file_len,
        );
    }
    if header.starts_with(&FAT_MAGIC) {
        // fat headers are big-endian, one 20 byte entry per slice
        let nfat_arch = read_u32(header, 4, false)? as usize;
        for index in 0..nfat_arch.min(16) {
            let entry = 8 + index * 20;
            if read_u32(header, entry, false)? != cputype {
                continue;
            }
            let offset = read_u32(header, entry + 8, false)? as u64;
            let size = read_u32(header, entry + 12, false)? as u64;
            return Some(offset + size <= file_len);
        }
    }
    Some(false)
}

const IMAGE_FILE_EXECUTABLE_IMAGE: u16 = 0x0002;

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub fn is_pe_for(header: &[u8], file_len: u64, machine: u16) -> bool {
    pe_matches(header, file_len, machine).unwrap_or(false)
}

fn pe_matches(header: &[u8], file_len: u64, machine: u16) -> Option<bool> {
    if !header.starts_with(b"MZ") {
        return Some(false);
    }
    let pe_offset = read_u32(header, 0x3c, true)? as usize;
    if header.get(pe_offset..pe_offset.checked_add(4)?)? != b"PE\0\0" {
        return Some(false);
    }
    let characteristics = read_u16(header, pe_offset + 22, true)?;
    Some(
        read_u16(header, pe_offset + 4, true)? == machine
            && characteristics & IMAGE_FILE_EXECUTABLE_IMAGE != 0
            && (pe_offset as u64 + 24) <= file_len,
    )
}

#[cfg(target_arch = "x86_64")]
const ELF_MACHINE: Option<u16> = Some(62);
#[cfg(target_arch = "x86")]
const ELF_MACHINE: Option<u16> = Some(3);
#[cfg(target_arch = "aarch64")]
const ELF_MACHINE: Option<u16> = Some(183);
#[cfg(target_arch = "arm")]
const ELF_MACHINE: Option<u16> = Some(40);
#[cfg(target_arch = "riscv64")]
const ELF_MACHINE: Option<u16> = Some(243);
#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "x86",
    target_arch = "aarch64",
    target_arch = "arm",
    target_arch = "riscv64"
)))]
const ELF_MACHINE: Option<u16> = None;

#[cfg_attr(any(target_os = "windows", target_os = "macos"), allow(dead_code))]
pub fn native_elf_target() -> ElfTarget {
    ElfTarget {
        machine: ELF_MACHINE,
        is_64: cfg!(target_pointer_width = "64"),
        little_endian: cfg!(target_endian = "little"),
    }
}

#[cfg(target_os = "windows")]
pub fn is_native_executable(header: &[u8], file_len: u64) -> bool {
    const MACHINE: u16 = if cfg!(target_arch = "aarch64") {
        0xaa64
    } else if cfg!(target_arch = "x86") {
        0x014c
    } else {
        0x8664
    };
    is_pe_for(header, file_len, MACHINE)
}

#[cfg(target_os = "macos")]
pub fn is_native_executable(header: &[u8], file_len: u64) -> bool {
    const CPU_TYPE: u32 = if cfg!(target_arch = "aarch64") {
        0x0100_000c
    } else {
        0x0100_0007
    };
    is_macho_for(header, file_len, CPU_TYPE)
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub fn is_native_executable(header: &[u8], file_len: u64) -> bool {
    is_elf_for(header, file_len, &native_elf_target())
}

pub fn is_script(header: &[u8]) -> bool {
    cfg!(unix) && header.starts_with(b"#!")
}
