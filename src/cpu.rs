//! # cpu
//!
//! One `step()` fetches the word at `pc`, moves `pc` on by two, decodes and
//! executes it. Jump and call targets are therefore absolute, and a skip is
//! just another `pc += 2`.
//!
//! The cpu holds nothing between steps except its random source, so a run is
//! simply a sequence of independent `step()` calls against the same
//! `Machine`.
use crate::config::ShiftSource;
use crate::error::MachineError;
use crate::input::Keypad;
use crate::instruction::Instruction;
use crate::machine::{Machine, VF};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// What a step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// the instruction ran to completion
    Executed(Instruction),
    /// Fx0A found no key held; `pc` points back at it so it runs again
    WaitingForKey,
}

pub struct Cpu<R: Rng = StdRng> {
    rng: R,
    shift_source: ShiftSource,
}

impl Cpu<StdRng> {
    /// seed the random source from `seed`, or from the clock
    pub fn new(seed: Option<u64>, shift_source: ShiftSource) -> Self {
        let seed = seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        });
        Cpu::with_rng(StdRng::seed_from_u64(seed), shift_source)
    }
}

impl<R: Rng> Cpu<R> {
    pub fn with_rng(rng: R, shift_source: ShiftSource) -> Self {
        Cpu { rng, shift_source }
    }

    /// fetch, decode and execute one instruction
    pub fn step(&mut self, m: &mut Machine, keypad: &Keypad) -> Result<Step, MachineError> {
        let pc = m.pc;
        let word = m.memory.get_word(pc).map_err(|e| e.at(pc))?;
        m.pc = pc.wrapping_add(2);
        let instruction = Instruction::decode(word);
        log::trace!("{:03x}: {:04x}  {}", pc, word, instruction);
        self.execute(m, keypad, instruction).map_err(|e| e.at(pc))
    }

    /// execute an already fetched instruction; `pc` must already point past it
    pub fn execute(
        &mut self,
        m: &mut Machine,
        keypad: &Keypad,
        instruction: Instruction,
    ) -> Result<Step, MachineError> {
        use Instruction::*;
        let v = &mut m.registers;
        match instruction {
            Cls => m.display.clear(),
            Ret => m.pc = m.stack.pop()?,
            Sys(addr) => log::debug!("ignoring machine code routine at 0x{:03x}", addr),
            Jp(addr) => m.pc = addr,
            Call(addr) => {
                m.stack.push(m.pc)?;
                m.pc = addr;
            }
            SeByte(x, nn) => skip_if(&mut m.pc, v[x] == nn),
            SneByte(x, nn) => skip_if(&mut m.pc, v[x] != nn),
            SeReg(x, y) => skip_if(&mut m.pc, v[x] == v[y]),
            LdByte(x, nn) => v[x] = nn,
            AddByte(x, nn) => v[x] = v[x].wrapping_add(nn),
            LdReg(x, y) => v[x] = v[y],
            Or(x, y) => v[x] |= v[y],
            And(x, y) => v[x] &= v[y],
            Xor(x, y) => v[x] ^= v[y],
            AddReg(x, y) => {
                let (sum, carry) = v[x].overflowing_add(v[y]);
                v[VF] = carry as u8;
                v[x] = sum;
            }
            Sub(x, y) => {
                let (a, b) = (v[x], v[y]);
                v[VF] = (a > b) as u8;
                v[x] = a.wrapping_sub(b);
            }
            Shr(x, y) => {
                let src = v[self.shift_operand(x, y)];
                v[VF] = src & 0x1;
                v[x] = src >> 1;
            }
            Subn(x, y) => {
                let (a, b) = (v[x], v[y]);
                v[VF] = (b > a) as u8;
                v[x] = b.wrapping_sub(a);
            }
            Shl(x, y) => {
                let src = v[self.shift_operand(x, y)];
                v[VF] = (src >> 7) & 0x1;
                v[x] = src << 1;
            }
            SneReg(x, y) => skip_if(&mut m.pc, v[x] != v[y]),
            LdI(addr) => m.i = addr,
            JpV0(addr) => m.pc = addr + v[0] as u16,
            Rnd(x, nn) => v[x] = self.rng.gen::<u8>() & nn,
            Drw(x, y, n) => {
                let sprite = m.memory.get_ro_slice(m.i, n as usize)?;
                let collided = m.display.draw_sprite(v[x], v[y], sprite);
                v[VF] = collided as u8;
            }
            Skp(x) => skip_if(&mut m.pc, keypad.is_down(v[x])?),
            Sknp(x) => skip_if(&mut m.pc, !keypad.is_down(v[x])?),
            LdRegDt(x) => v[x] = m.delay_timer.get(),
            LdKey(x) => match keypad.any_down() {
                Some(key) => v[x] = key,
                None => {
                    m.pc = m.pc.wrapping_sub(2);
                    return Ok(Step::WaitingForKey);
                }
            },
            LdDtReg(x) => m.delay_timer.set(v[x]),
            LdSt(x) => m.sound_timer.set(v[x]),
            AddI(x) => m.i = m.i.wrapping_add(v[x] as u16),
            LdF(x) => m.i = Chip8MemoryMap::font_addr(v[x]),
            LdB(x) => {
                let n = v[x];
                m.memory.write(&[n / 100, (n / 10) % 10, n % 10], m.i)?;
            }
            LdDerefIReg(x) => m.memory.write(&v[..=x], m.i)?,
            LdRegDerefI(x) => {
                let src = m.memory.get_ro_slice(m.i, x + 1)?;
                v[..=x].copy_from_slice(src);
            }
            Unknown(word) => log::debug!("ignoring unknown instruction 0x{:04x}", word),
        }
        Ok(Step::Executed(instruction))
    }

    fn shift_operand(&self, x: usize, y: usize) -> usize {
        match self.shift_source {
            ShiftSource::Vx => x,
            ShiftSource::Vy => y,
        }
    }
}

fn skip_if(pc: &mut u16, cond: bool) {
    if cond {
        *pc = pc.wrapping_add(2);
    }
}
